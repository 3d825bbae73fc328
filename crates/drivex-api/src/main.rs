//! Drivex server binary.
//!
//! Stateless HTTP service that extracts Google Drive resource identifiers
//! from sharing URLs.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! drivex --config config.yaml
//!
//! # With environment variables only
//! DRIVEX_SERVER__PORT=9090 drivex
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, Level};

use drivex_api::http::{create_router_with_observability, AppState};
use drivex_api::observability::{init_logging, init_metrics, LoggingConfig};
use drivex_server::ServerConfig;

/// Drivex - Google Drive identifier extraction service
#[derive(Parser, Debug)]
#[command(name = "drivex")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    // Initialize logging
    let log_config = LoggingConfig {
        json_format: config.logging.json,
        default_level: parse_log_level(&config.logging.level),
    };
    init_logging(log_config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        min_identifier_len = config.extraction.min_identifier_len,
        "Starting drivex server"
    );

    // Initialize metrics (always collected - config.metrics.enabled reserved
    // for future use; the path is currently fixed to /metrics in the router)
    let metrics_state = init_metrics()?;
    if config.metrics.enabled {
        info!("Metrics enabled at /metrics");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::with_min_identifier_len(config.extraction.min_identifier_len);
    let router = create_router_with_observability(state, metrics_state);

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let http_shutdown_rx = shutdown_tx.subscribe();
    let http_future = run_http_server(router, addr, http_shutdown_rx);

    let result = tokio::select! {
        result = http_future => {
            if let Err(ref e) = result {
                error!("HTTP server error: {}", e);
            }
            result
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server");
            let _ = shutdown_tx.send(());
            Ok(())
        }
    };

    info!("Server shutdown complete");
    result
}

/// Run the HTTP server with graceful shutdown.
async fn run_http_server(
    router: axum::Router,
    addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("HTTP server received shutdown signal");
        })
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Parse log level from string.
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_log_level("Info"), Level::INFO);
        assert_eq!(parse_log_level("WARN"), Level::WARN);
        assert_eq!(parse_log_level("error"), Level::ERROR);
        assert_eq!(parse_log_level("unknown"), Level::INFO);
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = Args::try_parse_from(["drivex"]).unwrap();
        assert!(args.config.is_none());

        let args = Args::try_parse_from(["drivex", "--config", "config.yaml"]).unwrap();
        assert_eq!(args.config, Some("config.yaml".to_string()));

        let args = Args::try_parse_from(["drivex", "-c", "test.yaml"]).unwrap();
        assert_eq!(args.config, Some("test.yaml".to_string()));
    }
}
