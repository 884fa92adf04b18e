//! Metrics Publisher.
//!
//! Prometheus-compatible metrics for the node probes. The HTTP layer owns
//! the `/metrics` route; this module only keeps the registry and encodes it.
//!
//! Typical usage:
//!
//! ```ignore
//! use std::sync::Arc;
//! use node_probe::metrics::MetricsRegistry;
//! use node_probe::config::MetricsConfig;
//!
//! let registry = Arc::new(MetricsRegistry::new(&MetricsConfig::default())?);
//!
//! // On every scrape:
//! registry.set_latest_block(block.gauge_value());
//! let body = registry.gather_text()?;
//! ```

pub mod prometheus;

pub use self::prometheus::{MetricsRegistry, NodeMetrics, TEXT_CONTENT_TYPE};
