//! Sync service: run a sync command and record its result.

use std::fmt;
use std::fs::{File, OpenOptions};

use fs2::FileExt;
use serde::Serialize;
use tracing::debug;

use crate::model::SyncCommand;
use crate::outbox::OutboxPublisher;
use crate::store::{SyncDb, SyncState};
use crate::sync::{CancellationToken, IterationSyncer, SyncError, SyncOutcome};

use super::{CoreContext, CoreError, CoreResult};

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Succeeded,
    Failed,
    Cancelled,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one sync run.
///
/// A failed or cancelled run is still a report, not an error: groups
/// committed before the failure stay committed and are counted in `outcome`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub system_id: String,
    pub status: SyncStatus,
    pub outcome: SyncOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Succeeded
    }
}

/// Service for sync operations.
pub struct SyncService<'a> {
    ctx: &'a CoreContext,
    db: &'a SyncDb,
}

impl<'a> SyncService<'a> {
    pub(crate) const fn new(ctx: &'a CoreContext, db: &'a SyncDb) -> Self {
        Self { ctx, db }
    }

    /// Parse a JSON sync command and run it.
    pub fn run_json(&self, json: &str, cancel: &CancellationToken) -> CoreResult<SyncReport> {
        let command = SyncCommand::from_json(json)?;
        self.run(&command, cancel)
    }

    /// Run one sync and record it in `sync_state`.
    ///
    /// Holds an exclusive lock next to the database for the whole run so two
    /// syncs never interleave. Returns `Err(CoreError::SyncInProgress)` if the
    /// lock is taken.
    pub fn run(&self, command: &SyncCommand, cancel: &CancellationToken) -> CoreResult<SyncReport> {
        let _lock = self.acquire_lock()?;

        let publisher = OutboxPublisher::new(&self.ctx.settings().outbox_path);
        let syncer = IterationSyncer::new(self.db, &publisher);

        let report = match syncer.sync(command, cancel) {
            Ok(outcome) => SyncReport {
                system_id: command.system_id.clone(),
                status: SyncStatus::Succeeded,
                outcome,
                error: None,
            },
            Err(failure) => SyncReport {
                system_id: command.system_id.clone(),
                status: if matches!(failure.error, SyncError::Cancelled) {
                    SyncStatus::Cancelled
                } else {
                    SyncStatus::Failed
                },
                error: Some(failure.error.to_string()),
                outcome: failure.outcome,
            },
        };

        self.db.record_sync_run(
            &report.system_id,
            report.status.as_str(),
            &report.outcome,
            report.error.as_deref(),
        )?;
        Ok(report)
    }

    /// Last recorded run per system, or just for `system_id`.
    pub fn status(&self, system_id: Option<&str>) -> CoreResult<Vec<SyncState>> {
        match system_id {
            Some(system_id) => Ok(self.db.get_sync_state(system_id)?.into_iter().collect()),
            None => Ok(self.db.list_sync_states()?),
        }
    }

    fn acquire_lock(&self) -> CoreResult<File> {
        let path = self.ctx.settings().lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| CoreError::Internal(anyhow::Error::new(e).context(format!(
                "Failed to open sync lock: {}",
                path.display()
            ))))?;

        if file.try_lock_exclusive().is_err() {
            return Err(CoreError::SyncInProgress {
                path: self.ctx.db_path().display().to_string(),
            });
        }
        debug!(lock = %path.display(), "Acquired sync lock");
        Ok(file)
    }
}
