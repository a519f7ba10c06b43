//! Deletion notices and the append-only outbox they are published to.
//!
//! Publishing is best effort: the sync engine logs a failed publish and moves
//! on. Downstream consumers read the outbox file as JSON Lines.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

/// Emitted once per iteration removed as an orphan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionNotice {
    pub iteration_id: String,
    pub timestamp: DateTime<Utc>,
}

impl DeletionNotice {
    pub fn new(iteration_id: impl Into<String>) -> Self {
        Self {
            iteration_id: iteration_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink for deletion notices.
pub trait EventPublisher {
    fn publish(&self, notice: &DeletionNotice) -> Result<()>;
}

/// File-backed outbox.
///
/// Uses advisory file locking (via `fs2`) so concurrent writers append whole
/// lines.
#[derive(Debug, Clone)]
pub struct OutboxPublisher {
    path: PathBuf,
}

impl OutboxPublisher {
    /// Point at an outbox file. The file and its parent directories are
    /// created on first publish.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every notice in the outbox, oldest first.
    pub fn read_all(&self) -> Result<Vec<DeletionNotice>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open outbox: {}", self.path.display()))
            }
        };

        file.lock_shared()
            .context("Failed to acquire shared lock")?;

        let mut notices = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read outbox line {idx}"))?;
            if line.trim().is_empty() {
                continue;
            }
            let notice = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse outbox line {idx}"))?;
            notices.push(notice);
        }
        Ok(notices)
    }
}

impl EventPublisher for OutboxPublisher {
    fn publish(&self, notice: &DeletionNotice) -> Result<()> {
        let json_line = serde_json::to_string(notice).context("Failed to serialize notice")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directories: {}", parent.display())
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open outbox: {}", self.path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire exclusive lock")?;
        file.seek(SeekFrom::End(0))
            .context("Failed to seek to end of outbox")?;
        writeln!(file, "{json_line}").context("Failed to write notice")?;
        file.flush().context("Failed to flush outbox")?;

        Ok(())
    }
}
