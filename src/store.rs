//! Newest-first snapshot list with a retention cap, optionally backed by a
//! JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::Snapshot;
use crate::core::constants::MAX_SNAPSHOTS;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    #[error("Snapshot file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads `path`. A missing file starts empty; an unreadable or malformed
    /// one is logged and also starts empty so the next save replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshots = match load_snapshots(&path) {
            Ok(list) => list,
            Err(err) => {
                warn!(path = %path.display(), "ignoring unreadable snapshot file: {err}");
                Vec::new()
            }
        };
        info!(path = %path.display(), count = snapshots.len(), "snapshot store opened");
        Self {
            path: Some(path),
            snapshots,
        }
    }

    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn get(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    /// Prepends `snapshot` and drops the oldest beyond the retention cap.
    /// The list only changes once it has been persisted.
    pub fn add(&mut self, snapshot: Snapshot) -> StoreResult<&[Snapshot]> {
        debug!(id = %snapshot.id, name = %snapshot.name, "adding snapshot");
        let mut next = Vec::with_capacity(MAX_SNAPSHOTS.min(self.snapshots.len() + 1));
        next.push(snapshot);
        next.extend(self.snapshots.iter().take(MAX_SNAPSHOTS - 1).cloned());
        self.commit(next)
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<&[Snapshot]> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let next = self
            .snapshots
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        self.commit(next)
    }

    /// Renames a snapshot. A blank name leaves it unchanged.
    pub fn rename(&mut self, id: &str, name: &str) -> StoreResult<&Snapshot> {
        let idx = self
            .snapshots
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let trimmed = name.trim();
        if !trimmed.is_empty() {
            let mut next = self.snapshots.clone();
            next[idx].name = trimmed.to_string();
            self.commit(next)?;
        }
        Ok(&self.snapshots[idx])
    }

    pub fn save(&self) -> StoreResult<()> {
        self.persist(&self.snapshots)
    }

    fn commit(&mut self, next: Vec<Snapshot>) -> StoreResult<&[Snapshot]> {
        self.persist(&next)?;
        self.snapshots = next;
        Ok(self.snapshots.as_slice())
    }

    fn persist(&self, snapshots: &[Snapshot]) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(snapshots)?)?;
        Ok(())
    }
}

fn load_snapshots(path: &Path) -> StoreResult<Vec<Snapshot>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&raw)?)
}
