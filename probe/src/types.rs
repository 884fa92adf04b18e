//! Request-scoped values reported by the probes.
//!
//! Everything here is built fresh for each probe and dropped once the
//! response has been produced. Nothing in this module is cached.

use std::fmt;

use serde::{Serialize, Serializer};

/// Text reported in JSON when no extraction rule produced a block number.
pub const NOT_FOUND_TEXT: &str = "Not found";

/// The most recent N lines of the node log, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogTailWindow {
    lines: Vec<String>,
}

impl LogTailWindow {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Lines in chronological order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl<S: Into<String>> FromIterator<S> for LogTailWindow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Latest block number extracted from a tail window.
///
/// Serialises as the bare integer when found, or as `"Not found"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockNumber {
    Found(u64),
    NotFound,
}

impl BlockNumber {
    /// Value to publish on the gauge; `NotFound` publishes 0.
    pub fn gauge_value(&self) -> i64 {
        match self {
            BlockNumber::Found(n) => i64::try_from(*n).unwrap_or(i64::MAX),
            BlockNumber::NotFound => 0,
        }
    }
}

impl From<Option<u64>> for BlockNumber {
    fn from(value: Option<u64>) -> Self {
        value.map_or(BlockNumber::NotFound, BlockNumber::Found)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockNumber::Found(n) => write!(f, "{n}"),
            BlockNumber::NotFound => f.write_str(NOT_FOUND_TEXT),
        }
    }
}

impl Serialize for BlockNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockNumber::Found(n) => serializer.serialize_u64(*n),
            BlockNumber::NotFound => serializer.serialize_str(NOT_FOUND_TEXT),
        }
    }
}

/// Coarse service state as reported by the service manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Active,
    Inactive,
    Unknown,
}

impl ServiceState {
    /// Maps `systemctl is-active` output onto a state.
    pub fn from_is_active(output: &str) -> Self {
        match output.trim() {
            "active" => ServiceState::Active,
            "inactive" | "failed" | "deactivating" => ServiceState::Inactive,
            _ => ServiceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Active => "active",
            ServiceState::Inactive => "inactive",
            ServiceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service liveness together with its main process id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Unit name, e.g. `redbelly.service`.
    pub name: String,
    #[serde(rename = "status")]
    pub state: ServiceState,
    pub pid: Option<String>,
}

impl ServiceStatus {
    pub fn is_active(&self) -> bool {
        self.state == ServiceState::Active
    }
}
