use chrono::{DateTime, Local, Utc};
use tracing::debug;
use uuid::Uuid;

use super::alerts::{AlertContext, compute_alerts, digest_alerts};
use super::engine::project;
use super::milestones::{build_milestone_grid, cell_text, find_milestones, next_milestone_base};
use super::types::{
    Comparison, EndNetWorth, LifeConfig, MilestoneCell, MilestoneComparison, MilestoneGridRow,
    MilestoneHit, Scenario, Snapshot, SnapshotSummary,
};

/// End-of-horizon net worth, milestone grid and alert digest for `config`.
pub fn summarize(config: &LifeConfig) -> SnapshotSummary {
    let rows = project(config);
    let end = rows
        .last()
        .map(|last| EndNetWorth {
            vnd: last.nw_vnd,
            usd: last.nw_usd,
        })
        .unwrap_or_default();

    let hits = find_milestones(&rows);
    let alerts = compute_alerts(config, &rows, &AlertContext::default());

    debug!(
        rows = rows.len(),
        milestone_hits = hits.len(),
        "summarized configuration"
    );

    SnapshotSummary {
        end,
        milestones: build_milestone_grid(&hits),
        alerts: digest_alerts(&alerts),
    }
}

/// Captures `config` and its summary. A blank or missing name falls back to
/// the local creation time.
pub fn create_snapshot(config: &LifeConfig, name: Option<&str>) -> Snapshot {
    let created = Utc::now();
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_snapshot_name(created));

    Snapshot {
        id: Uuid::new_v4().to_string(),
        created_at: created.timestamp_millis(),
        name,
        config: config.clone(),
        summary: summarize(config),
    }
}

fn default_snapshot_name(created: DateTime<Utc>) -> String {
    created
        .with_timezone(&Local)
        .format("%H:%M:%S %d/%m/%Y")
        .to_string()
}

/// Slippage baseline: the smallest base milestone year of the latest
/// snapshot (recomputed from its stored configuration) against `current_hits`.
pub fn alert_context(current_hits: &[MilestoneHit], latest: Option<&Snapshot>) -> AlertContext {
    let last_snapshot_next_base_year = latest.and_then(|snapshot| {
        let hits = find_milestones(&project(&snapshot.config));
        next_milestone_base(&hits).map(|hit| hit.year)
    });

    AlertContext {
        last_snapshot_next_base_year,
        current_next_base_year: next_milestone_base(current_hits).map(|hit| hit.year),
    }
}

/// Differences from `a` to `b` (always `b - a`).
pub fn compare(a: &Snapshot, b: &Snapshot) -> Comparison {
    let a_base_usd = a.summary.end.usd.base;
    let b_base_usd = b.summary.end.usd.base;

    let mut targets: Vec<&str> = Vec::new();
    for row in a.summary.milestones.iter().chain(&b.summary.milestones) {
        if !targets.contains(&row.target.as_str()) {
            targets.push(&row.target);
        }
    }

    let milestones = targets
        .into_iter()
        .map(|target| {
            let a_cell = base_cell(&a.summary.milestones, target);
            let b_cell = base_cell(&b.summary.milestones, target);
            let delta_years = match (
                a_cell.and_then(|c| c.year()),
                b_cell.and_then(|c| c.year()),
            ) {
                (Some(a_year), Some(b_year)) => Some(b_year - a_year),
                _ => None,
            };

            MilestoneComparison {
                target: target.to_string(),
                a: cell_text(a_cell),
                b: cell_text(b_cell),
                delta_years,
            }
        })
        .collect();

    Comparison {
        a_id: a.id.clone(),
        b_id: b.id.clone(),
        a_name: a.name.clone(),
        b_name: b.name.clone(),
        a_base_usd,
        b_base_usd,
        delta_base_usd: b_base_usd - a_base_usd,
        milestones,
        a_alerts: a.summary.alerts.counts,
        b_alerts: b.summary.alerts.counts,
    }
}

fn base_cell<'a>(grid: &'a [MilestoneGridRow], target: &str) -> Option<&'a MilestoneCell> {
    grid.iter()
        .find(|row| row.target == target)
        .and_then(|row| row.cell(Scenario::Base))
}
