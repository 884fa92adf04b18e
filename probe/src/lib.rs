//! Node probe library crate.
//!
//! This crate provides the building blocks of the Redbelly node health
//! sidecar:
//!
//! - request-scoped values reported by the probes (`types`),
//! - log-derived block number extraction (`extract`),
//! - reading the tail of the node log (`tail`),
//! - querying the systemd unit running the node (`service`),
//! - composing probes into status snapshots (`aggregator`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level probe configuration (`config`).
//!
//! The HTTP surface lives in the `health-gateway` binary; everything with
//! actual decision logic lives here.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod service;
pub mod tail;
pub mod types;

// Re-export top-level configuration types.
pub use config::{LogConfig, MetricsConfig, NodeConfig, ServiceConfig};

// Re-export error types.
pub use error::{ConfigError, ProbeError, RuleError};

// Re-export the extraction core.
pub use extract::{BlockExtractor, ExtractionRule, RuleMatch, RuleTable};

// Re-export probe interfaces and their OS-backed implementations.
pub use service::{ServiceProbe, SystemdProbe};
pub use tail::{FileTailReader, LogTailReader};

// Re-export the aggregator and its snapshots.
pub use aggregator::{DetailedStatus, ServiceHealth, StatusAggregator};

// Re-export metrics registry.
pub use metrics::{MetricsRegistry, NodeMetrics};

// Re-export domain types at the crate root for convenience.
pub use types::*;
