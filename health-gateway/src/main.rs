// health-gateway/src/main.rs

//! Health gateway binary.
//!
//! This binary exposes a small HTTP API on top of the `node_probe` crate:
//!
//! - `GET /`
//! - `GET /health/service`
//! - `GET /health/block`
//! - `GET /health/detailed`
//! - `GET /health/logs?lines=N`
//! - `GET /metrics`
//!
//! It probes the node's systemd unit and rolling log file on every request;
//! the only state kept between requests is the Prometheus registry.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;

use node_probe::{MetricsRegistry, StatusAggregator};

use config::{ApiConfig, Args};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "health_gateway=info,node_probe=info,tower_http=info".to_string()
        }))
        .init();

    let api_cfg = ApiConfig::from(Args::parse());

    if let Err(e) = run(api_cfg).await {
        tracing::error!("fatal error: {e}");
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(api_cfg: ApiConfig) -> Result<(), String> {
    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new(&api_cfg.node.metrics)
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    // ---------------------------
    // Probes
    // ---------------------------

    let aggregator = StatusAggregator::from_config(&api_cfg.node)
        .map_err(|e| format!("failed to set up probes: {e}"))?;

    let app_state: SharedState = Arc::new(AppState {
        aggregator,
        metrics,
        log: api_cfg.node.log.clone(),
    });

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = routes::router(app_state);

    tracing::info!(
        "health gateway listening on http://{} (unit {}, log {})",
        api_cfg.listen_addr,
        api_cfg.node.service.unit,
        api_cfg.node.log.path.display()
    );

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C or SIGTERM and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
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
    tracing::info!("shutdown signal received");
}
