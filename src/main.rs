//! Wall Connector Exporter Binary Entry Point
//!
//! Serves the Wall Connector's readings as Prometheus metrics.
//! Core functionality is provided by the `wallconnector` library crate.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallconnector::{
    Client,
    config::{AppConfig, parse_duration},
    server::{AppState, create_router},
    wallconnector_collector,
};

/// Wall Connector Exporter - Prometheus metrics for the Tesla Wall Connector
#[derive(Parser, Debug)]
#[command(name = "wallconnector-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "WALLCONNECTOR_CONFIG")]
    config: Option<String>,

    /// Listen address as host:port (overrides config file)
    #[arg(long, env = "WALLCONNECTOR_ADDR")]
    addr: Option<SocketAddr>,

    /// Path the metrics are served on (overrides config file)
    #[arg(long, env = "WALLCONNECTOR_PATH")]
    path: Option<String>,

    /// Wall connector address as host[:port] (overrides config file)
    #[arg(long, env = "WALLCONNECTOR_TARGET")]
    target: Option<String>,

    /// Deadline for one scrape, e.g. "5s" (overrides config file)
    #[arg(long, env = "WALLCONNECTOR_SCRAPE_TIMEOUT", value_parser = parse_duration)]
    scrape_timeout: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wallconnector=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Wall Connector Exporter");

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(addr) = cli.addr {
        config.server.bind = addr.ip().to_string();
        config.server.port = addr.port();
    }
    if let Some(path) = cli.path {
        config.server.path = path;
    }
    if let Some(target) = cli.target {
        config.target.addr = target;
    }
    if let Some(timeout) = cli.scrape_timeout {
        config.scrape.timeout = timeout;
    }
    config.validate()?;

    tracing::info!(
        "Server: {}:{}{}, Target: {}",
        config.server.bind,
        config.server.port,
        config.server.path,
        config.target.base_url(),
    );

    let client = Client::new(config.target.clone())?;

    let deadline = tokio::time::Instant::now() + config.target.timeout;
    match client.version(deadline).await {
        Ok(version) => tracing::info!(
            "Connected to {} (firmware {}, part {}, serial {})",
            config.target.addr,
            version.firmware_version,
            version.part_number,
            version.serial_number,
        ),
        Err(e) => tracing::warn!("Failed to read device version: {}", e),
    }

    let collector = wallconnector_collector(&client)?;
    tracing::info!(
        "Registered {} sources exporting {} descriptors",
        collector.len(),
        collector.describe().len()
    );

    let app_state = AppState {
        collector: Arc::new(collector),
        scrape_timeout: config.scrape.timeout,
        metrics_path: config.server.path.clone(),
    };

    let app = create_router(app_state);

    let addr = SocketAddr::new(config.server.bind.parse::<IpAddr>()?, config.server.port);

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
