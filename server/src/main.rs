//! slidemaker-server - HTTP API for inserting slides into PowerPoint presentations

use anyhow::{Context, Result};
use clap::Parser;
use slidemaker::Limits;
use slidemaker_server::{router, AppState};
use std::net::{IpAddr, SocketAddr};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Insert slides into PowerPoint presentations over HTTP
#[derive(Parser, Debug)]
#[command(name = "slidemaker-server", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "SLIDEMAKER_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SLIDEMAKER_PORT", default_value_t = 5000)]
    port: u16,

    /// Largest accepted presentation, in megabytes
    #[arg(long, env = "SLIDEMAKER_MAX_FILE_MB", default_value_t = 50)]
    max_file_mb: u64,

    /// Largest accepted image, in megabytes
    #[arg(long, env = "SLIDEMAKER_MAX_IMAGE_MB", default_value_t = 10)]
    max_image_mb: u64,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let limits = Limits::with_megabytes(cli.max_file_mb, cli.max_image_mb);
    let state = AppState::new(limits);
    let address = SocketAddr::new(cli.host, cli.port);

    info!(
        address = %address,
        max_file_mb = cli.max_file_mb,
        max_image_mb = cli.max_image_mb,
        body_limit = state.body_limit,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, starting graceful shutdown...");
}
