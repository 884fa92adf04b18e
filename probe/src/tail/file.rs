//! File-backed tail reader.
//!
//! Reads the log backwards from its end in fixed-size chunks until enough
//! line breaks have been seen, so the cost of a probe depends on the size of
//! the window and not on the size of the (rolling, possibly large) log file.

use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::LogTailReader;
use crate::error::ProbeError;
use crate::types::LogTailWindow;

const CHUNK_SIZE: u64 = 8 * 1024;

/// Tails a log file on the local filesystem.
#[derive(Clone, Debug)]
pub struct FileTailReader {
    path: PathBuf,
}

impl FileTailReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, source: std::io::Error) -> ProbeError {
        ProbeError::LogRead {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl LogTailReader for FileTailReader {
    async fn read_tail(&self, lines: usize) -> Result<LogTailWindow, ProbeError> {
        let mut file = File::open(&self.path)
            .await
            .map_err(|e| self.read_error(e))?;

        if lines == 0 {
            return Ok(LogTailWindow::default());
        }

        let len = file
            .metadata()
            .await
            .map_err(|e| self.read_error(e))?
            .len();

        // `buf` always holds the bytes from `pos` to `len`.
        let mut pos = len;
        let mut buf: Vec<u8> = Vec::new();
        let mut newlines = 0usize;

        while pos > 0 && newlines <= lines {
            let step = CHUNK_SIZE.min(pos);
            pos -= step;

            file.seek(SeekFrom::Start(pos))
                .await
                .map_err(|e| self.read_error(e))?;

            let mut chunk = vec![0u8; step as usize];
            file.read_exact(&mut chunk)
                .await
                .map_err(|e| self.read_error(e))?;

            newlines += chunk.iter().filter(|&&b| b == b'\n').count();
            chunk.extend_from_slice(&buf);
            buf = chunk;
        }

        let window = last_lines(&buf, lines);
        tracing::trace!(
            path = %self.path.display(),
            bytes = buf.len(),
            lines = window.len(),
            "read log tail"
        );
        Ok(window)
    }
}

/// Splits `bytes` into lines and keeps the last `n`.
///
/// A partial first line (when `bytes` starts mid-file) is always dropped
/// because the reader collects more than `n` line breaks before stopping.
fn last_lines(bytes: &[u8], n: usize) -> LogTailWindow {
    let text = String::from_utf8_lossy(bytes);
    let body = text.strip_suffix('\n').unwrap_or(&text);
    if body.is_empty() {
        return LogTailWindow::default();
    }

    let all: Vec<&str> = body.split('\n').collect();
    let start = all.len().saturating_sub(n);

    all[start..]
        .iter()
        .map(|line| line.trim_end_matches('\r'))
        .collect()
}
