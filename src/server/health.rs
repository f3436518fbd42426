//! Health endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub keys: usize,
    pub uptime_seconds: u64,
    pub batches: u64,
    pub files_reviewed: u64,
    pub files_failed: u64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.stats.read().clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        keys: state.key_count,
        uptime_seconds: state.uptime_seconds(),
        batches: stats.batches,
        files_reviewed: stats.files_reviewed,
        files_failed: stats.files_failed,
    })
}
