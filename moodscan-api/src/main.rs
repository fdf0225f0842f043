//! moodscan-api - HTTP entry point
//!
//! Serves the mood analysis pipeline over REST: single and batch upload
//! analysis plus health and build information endpoints.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodscan_api::{build_router, ApiConfig, AppState};

/// Command-line arguments for moodscan-api
#[derive(Parser, Debug)]
#[command(name = "moodscan-api")]
#[command(about = "HTTP API for music mood and genre analysis")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "MOODSCAN_API_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MOODSCAN_API_PORT")]
    port: Option<u16>,

    /// TOML config file (default: <config dir>/moodscan/api.toml when present)
    #[arg(long, env = "MOODSCAN_API_CONFIG")]
    config: Option<PathBuf>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MOODSCAN_API_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Seconds of audio analyzed per upload
    #[arg(long, env = "MOODSCAN_API_MAX_ANALYSIS_SECONDS")]
    max_analysis_seconds: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodscan_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    // File and default tiers, then flag/env overrides on top
    let mut config = ApiConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bytes) = args.max_upload_bytes {
        config.max_upload_bytes = bytes;
    }
    if let Some(seconds) = args.max_analysis_seconds {
        config.max_analysis_seconds = seconds;
    }

    info!(
        "Starting moodscan API on {}:{}",
        config.host, config.port
    );
    info!(
        "Upload limit: {} bytes, analysis window: {} seconds",
        config.max_upload_bytes, config.max_analysis_seconds
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    let app = build_router(AppState::new(config));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
