//! critiq server binary

use anyhow::Result;
use clap::Parser;
use critiq::{config::Settings, server};
use tracing_subscriber::EnvFilter;

/// LLM-powered code audit service with automatic API key rotation
#[derive(Parser, Debug)]
#[command(name = "critiq")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Model identifier sent to the provider (overrides MODEL env var)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first so the log level is available
    let mut settings = Settings::load()?;

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(model) = args.model {
        settings.model = model;
    }

    init_tracing(&settings.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %settings.model,
        host = %settings.host,
        port = settings.port,
        "Starting critiq"
    );

    server::serve(settings).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
