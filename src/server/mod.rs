//! HTTP service
//!
//! Thin glue around the pipeline: an upload endpoint, a health endpoint,
//! and graceful shutdown handling.

pub mod analyze;
pub mod error;
pub mod health;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, ServiceStats};

use crate::client::{GroqBackend, RotatingClient, RotationConfig};
use crate::config::{Settings, KEY_ENV_BASE};
use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;

/// Build the rotation client from the environment and serve until shutdown.
///
/// Fails before binding when no API keys are discovered; a service that can
/// never complete a request should not start.
pub async fn serve(settings: Settings) -> Result<()> {
    let backend = GroqBackend::with_base_url(&settings.base_url)?;
    let config = RotationConfig::from_settings(&settings);
    let client = RotatingClient::from_env(backend, config, KEY_ENV_BASE)?;

    let addr = settings.server_addr().parse::<SocketAddr>()?;
    let state = AppState::new(settings, client);
    let router = routes::create_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Completes when SIGINT (Ctrl+C) or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
