use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{import_config, validate};
use crate::core::{
    Alert, LifeConfig, MilestoneGridRow, MilestoneHit, ProjectionRow, Snapshot, SnapshotSummary,
    alert_context, build_milestone_grid, compare, compute_alerts, create_snapshot,
    find_milestones, project, summarize,
};
use crate::store::{SnapshotStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<SnapshotStore>>,
}

impl AppState {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

/// Everything the dashboard shows for one configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub rows: Vec<ProjectionRow>,
    pub milestone_hits: Vec<MilestoneHit>,
    pub milestones: Vec<MilestoneGridRow>,
    pub alerts: Vec<Alert>,
    pub summary: SnapshotSummary,
}

/// Projects `config`, measuring milestone slippage against `latest` when given.
pub fn build_report(config: &LifeConfig, latest: Option<&Snapshot>) -> ProjectionReport {
    let rows = project(config);
    let milestone_hits = find_milestones(&rows);
    let context = alert_context(&milestone_hits, latest);
    let alerts = compute_alerts(config, &rows, &context);

    ProjectionReport {
        milestones: build_milestone_grid(&milestone_hits),
        summary: summarize(config),
        rows,
        milestone_hits,
        alerts,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CreateSnapshotPayload {
    name: Option<String>,
    config: LifeConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenamePayload {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompareQuery {
    a: Option<String>,
    b: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/config/default", get(default_config_handler))
        .route("/api/project", post(project_handler))
        .route(
            "/api/snapshots",
            get(list_snapshots_handler).post(create_snapshot_handler),
        )
        .route(
            "/api/snapshots/:id",
            get(get_snapshot_handler)
                .patch(rename_snapshot_handler)
                .delete(delete_snapshot_handler),
        )
        .route("/api/compare", get(compare_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, store: SnapshotStore) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(AppState::new(store));

    let listener = TcpListener::bind(addr).await?;
    info!("net worth compass API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/config/default");

    axum::serve(listener, app).await
}

async fn default_config_handler() -> Response {
    json_response(StatusCode::OK, LifeConfig::default())
}

async fn project_handler(State(state): State<AppState>, body: String) -> Response {
    let config = match import_config(&body) {
        Ok(config) => config,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    let store = state.store.read().await;
    let report = build_report(&config, store.latest());
    info!(
        horizon = config.horizon_years,
        worst = ?report.summary.alerts.worst,
        "projection computed"
    );
    json_response(StatusCode::OK, report)
}

async fn list_snapshots_handler(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    json_response(StatusCode::OK, store.list())
}

async fn get_snapshot_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.read().await;
    match store.get(&id) {
        Some(snapshot) => json_response(StatusCode::OK, snapshot),
        None => store_error_response(StoreError::NotFound(id)),
    }
}

async fn create_snapshot_handler(State(state): State<AppState>, body: String) -> Response {
    let payload = match serde_json::from_str::<CreateSnapshotPayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid API JSON payload: {e}"),
            );
        }
    };
    if let Err(err) = validate(&payload.config) {
        return error_response(StatusCode::BAD_REQUEST, &err.to_string());
    }

    let snapshot = create_snapshot(&payload.config, payload.name.as_deref());
    let stored = snapshot.clone();
    match mutate_store(&state, move |store| store.add(stored).map(<[Snapshot]>::len)).await {
        Ok(retained) => {
            info!(id = %snapshot.id, retained, "snapshot created");
            json_response(StatusCode::CREATED, snapshot)
        }
        Err(response) => response,
    }
}

async fn rename_snapshot_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Response {
    let payload = match serde_json::from_str::<RenamePayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid API JSON payload: {e}"),
            );
        }
    };

    let renamed = mutate_store(&state, move |store| {
        store.rename(&id, &payload.name).map(Snapshot::clone)
    })
    .await;
    match renamed {
        Ok(snapshot) => json_response(StatusCode::OK, snapshot),
        Err(response) => response,
    }
}

async fn delete_snapshot_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let target = id.clone();
    let deleted = mutate_store(&state, move |store| {
        store.delete(&target).map(<[Snapshot]>::to_vec)
    })
    .await;
    match deleted {
        Ok(remaining) => {
            info!(%id, remaining = remaining.len(), "snapshot deleted");
            json_response(StatusCode::OK, remaining)
        }
        Err(response) => response,
    }
}

/// Runs a store mutation on the blocking pool while holding the write lock,
/// since every mutation rewrites the snapshot file.
async fn mutate_store<T, F>(state: &AppState, op: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&mut SnapshotStore) -> StoreResult<T> + Send + 'static,
{
    let mut store = Arc::clone(&state.store).write_owned().await;
    match tokio::task::spawn_blocking(move || op(&mut *store)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(store_error_response(err)),
        Err(err) => {
            warn!("snapshot store task failed: {err}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Snapshot store task failed",
            ))
        }
    }
}

async fn compare_handler(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Response {
    let (Some(a_id), Some(b_id)) = (query.a, query.b) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "both a and b snapshot ids are required",
        );
    };

    let store = state.store.read().await;
    let Some(a) = store.get(&a_id) else {
        return store_error_response(StoreError::NotFound(a_id));
    };
    let Some(b) = store.get(&b_id) else {
        return store_error_response(StoreError::NotFound(b_id));
    };
    json_response(StatusCode::OK, compare(a, b))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn store_error_response(err: StoreError) -> Response {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Json(_) => {
            warn!("snapshot store failure: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, &err.to_string())
}
