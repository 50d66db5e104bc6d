// src/logtail/tail.rs

use std::io::SeekFrom;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};

/// Incremental reader over an append-only log file. Tracks a byte offset and
/// yields only complete lines appended since the last poll. The offset is
/// in-memory only; a process restart re-reads from the top.
pub struct LogTail {
    path: PathBuf,
    offset: u64,
}

impl LogTail {
    pub fn new(path: PathBuf) -> Self {
        Self { path, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads everything appended past the current offset and returns the
    /// complete lines, in file order. A trailing line with no newline yet is
    /// left in place until a later poll completes it. A missing file is not
    /// an error; the next poll retries. A file shorter than the offset means
    /// rotation, and reading restarts from the top.
    pub async fn poll(&mut self) -> Vec<String> {
        let mut file = match File::open(&self.path).await {
            Ok(f) => f,
            Err(e) => {
                warn!("log file {} not readable: {e}", self.path.display());
                return Vec::new();
            }
        };

        let len = match file.metadata().await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!("could not stat log file {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        if len < self.offset {
            debug!(
                "log file {} shrank ({len} < {}); assuming rotation",
                self.path.display(),
                self.offset
            );
            self.offset = 0;
        }

        if let Err(e) = file.seek(SeekFrom::Start(self.offset)).await {
            warn!("seek in {} failed: {e}", self.path.display());
            return Vec::new();
        }

        let mut buf = Vec::new();
        if let Err(e) = file.read_to_end(&mut buf).await {
            warn!("read from {} failed: {e}", self.path.display());
            return Vec::new();
        }

        // Consume only up to the last completed line.
        let consumed = match buf.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None => return Vec::new(),
        };
        self.offset += consumed as u64;

        String::from_utf8_lossy(&buf[..consumed])
            .lines()
            .map(str::to_string)
            .collect()
    }
}
