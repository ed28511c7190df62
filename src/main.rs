//! Site settings service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http (axum) ──▶ SettingsApi
//!                                 │
//!            ┌────────────────────┼──────────────────────────┐
//!            ▼                    ▼                          ▼
//!     browse / read            edit pipeline          routes upload/download
//!     cache → gate →           normalize → gate →     backup → replace →
//!     projector                validate → store →     reload (rollback on
//!                              refresh cache          failure)
//!            │                    │                          │
//!            └──── PermissionEngine (roles) ─────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use site_settings::config::{load_config, ServiceConfig};
use site_settings::lifecycle::{build_api, signals, Shutdown};
use site_settings::observability::{logging, metrics};
use site_settings::HttpServer;

#[derive(Parser)]
#[command(name = "site-settings")]
#[command(about = "Settings management service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("site-settings v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        content = %config.content.path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let api = Arc::new(build_api(&config).await?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_termination(shutdown.clone()));

    let server = HttpServer::new(&config, api);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
