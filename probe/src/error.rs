//! Error types for probes, rule tables and configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while probing the node (service manager or log file).
///
/// A probe error is always reported to the caller; it is never retried and
/// never folded into a "not found" answer.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The service manager command could not be executed at all.
    #[error("failed to run `{command}` for {unit}: {source}")]
    ServiceQuery {
        unit: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The service manager ran but produced no usable answer.
    #[error("service manager returned no usable output for {unit}: {message}")]
    ServiceOutput { unit: String, message: String },

    /// The node log could not be opened or read.
    #[error("failed to read log file {}: {source}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A probe did not complete within its deadline.
    #[error("{probe} probe timed out after {}s", after.as_secs_f64())]
    Timeout { probe: &'static str, after: Duration },
}

impl ProbeError {
    /// Which external source failed: `"service"` or `"log"`.
    pub fn source_kind(&self) -> &'static str {
        match self {
            ProbeError::ServiceQuery { .. } | ProbeError::ServiceOutput { .. } => "service",
            ProbeError::LogRead { .. } => "log",
            ProbeError::Timeout { probe, .. } => {
                if *probe == LOG_PROBE {
                    "log"
                } else {
                    "service"
                }
            }
        }
    }
}

/// Probe name used for log reads in [`ProbeError::Timeout`].
pub const LOG_PROBE: &str = "log";

/// Errors raised while loading an extraction rule table.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rules file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules document: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("rule `{name}` has an invalid pattern: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule `{name}` pattern has no capture group named `{group}`")]
    MissingGroup { name: String, group: String },

    #[error("rule table contains no rules")]
    Empty,
}

/// Invalid configuration detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Rules(#[from] RuleError),
}
