use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use crate::archive::ArchivalClient;
use crate::db::Store;
use crate::staging::StagingArea;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the application start time. Call once during startup.
pub fn record_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Health check response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub db: String,
    pub archive: String,
    /// Directory attachments are staged in before archival.
    pub staging: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Health check handler.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(store): State<Store>,
    State(archive): State<Arc<ArchivalClient>>,
    State(staging): State<StagingArea>,
) -> Json<HealthResponse> {
    let db_status = match store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {e}"),
    };

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    Json(HealthResponse {
        status: "ok".to_string(),
        store: store.backend_name().to_string(),
        db: db_status,
        archive: archive.backend_name().to_string(),
        staging: staging.root().display().to_string(),
        uptime_seconds: uptime,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
