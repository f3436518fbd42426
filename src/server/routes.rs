//! Application routing

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::server::{analyze, health, state::AppState};

/// Uploads are whole project folders; allow a generous body
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/analyze", post(analyze::analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Permissive CORS so the browser frontend can call from anywhere
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
