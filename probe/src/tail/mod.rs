//! Log Tail Reader.
//!
//! Produces a fresh [`LogTailWindow`] on every call. The trait keeps the
//! aggregator independent of where the log lives so tests can hand it a
//! fixed window.

pub mod file;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::types::LogTailWindow;

pub use file::FileTailReader;

/// Source of the most recent lines of the node log.
#[async_trait]
pub trait LogTailReader: Send + Sync {
    /// Returns at most `lines` of the newest log lines, oldest first.
    async fn read_tail(&self, lines: usize) -> Result<LogTailWindow, ProbeError>;
}
