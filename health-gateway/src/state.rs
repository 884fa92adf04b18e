//! Shared application state.

use std::sync::Arc;

use node_probe::{LogConfig, MetricsRegistry, StatusAggregator};

/// Shared state held by the request handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. Nothing in here changes per request except the
/// metrics gauges.
pub struct AppState {
    /// Runs the service and log probes.
    pub aggregator: StatusAggregator,
    /// Metrics registry behind `/metrics`.
    pub metrics: Arc<MetricsRegistry>,
    /// Tail window defaults and limits.
    pub log: LogConfig,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
