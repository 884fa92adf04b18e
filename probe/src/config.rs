//! Configuration for the node probes.
//!
//! This module aggregates configuration for:
//!
//! - the probed systemd unit (`ServiceConfig`),
//! - log tailing and block extraction (`LogConfig`),
//! - the Prometheus registry (`MetricsConfig`).
//!
//! `NodeConfig` bundles all three so a binary can build it from flags,
//! environment variables, or defaults, and validate it once at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, RuleError};
use crate::extract::RuleTable;

/// Default location of the Redbelly node's rolling log.
pub const DEFAULT_LOG_PATH: &str = "/var/log/redbelly/rbn_logs/rbbc_logs.log";

/// Default systemd unit running the node.
pub const DEFAULT_SERVICE_UNIT: &str = "redbelly.service";

/// Which systemd unit to probe.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub unit: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            unit: DEFAULT_SERVICE_UNIT.to_string(),
        }
    }
}

/// Log tailing and extraction settings.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Path of the node log file.
    pub path: PathBuf,
    /// Tail window size used when a request does not ask for one.
    pub tail_lines: usize,
    /// Upper bound on any requested tail window.
    pub max_tail_lines: usize,
    /// Deadline for each external call (log read, systemctl).
    pub probe_timeout: Duration,
    /// Optional TOML rule table replacing the built-in one.
    pub rules_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            tail_lines: 1000,
            max_tail_lines: 10_000,
            probe_timeout: Duration::from_secs(5),
            rules_file: None,
        }
    }
}

impl LogConfig {
    /// Clamps a requested window size to `max_tail_lines`.
    pub fn clamp_lines(&self, requested: usize) -> usize {
        requested.min(self.max_tail_lines)
    }

    /// Loads the configured rule table, or the built-in one.
    pub fn load_rules(&self) -> Result<RuleTable, RuleError> {
        match &self.rules_file {
            Some(path) => RuleTable::from_file(path),
            None => Ok(RuleTable::default()),
        }
    }
}

/// Configuration for the Prometheus registry.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Prefix applied to every metric in the registry.
    pub namespace: String,
    /// Whether to register the default `process_*` collector.
    pub process_metrics: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: "redbelly".to_string(),
            process_metrics: true,
        }
    }
}

/// Top-level configuration for the probes.
#[derive(Clone, Debug, Default)]
pub struct NodeConfig {
    pub service: ServiceConfig,
    pub log: LogConfig,
    pub metrics: MetricsConfig,
}

impl NodeConfig {
    /// Rejects settings the probes cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.unit.trim().is_empty() {
            return Err(ConfigError::Invalid("service unit must not be empty".into()));
        }
        if self.log.tail_lines == 0 {
            return Err(ConfigError::Invalid("tail_lines must be at least 1".into()));
        }
        if self.log.tail_lines > self.log.max_tail_lines {
            return Err(ConfigError::Invalid(format!(
                "tail_lines={} exceeds max_tail_lines={}",
                self.log.tail_lines, self.log.max_tail_lines
            )));
        }
        if self.log.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid("probe timeout must be non-zero".into()));
        }
        Ok(())
    }
}
