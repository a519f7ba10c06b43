//! Sync reconciliation engine.
//!
//! Reconciles a batch of externally sourced iterations into the local
//! store, one project group at a time:
//!
//! 1. [`grouping`] partitions the batch by project and indexes existing
//!    iterations by external id.
//! 2. [`reconcile`] finds orphans and plans creates/updates, applying the
//!    sprint downgrade rule.
//! 3. [`engine`] deletes orphans (best effort), commits each group in its own
//!    transaction, and logs per-group and rollup outcomes.

pub mod cancel;
pub mod engine;
pub mod grouping;
pub mod outcome;
pub mod reconcile;

pub use cancel::CancellationToken;
pub use engine::IterationSyncer;
pub use grouping::{group_by_project, ExistingIndex, ProjectGroup};
pub use outcome::SyncOutcome;
pub use reconcile::{find_orphans, plan_upserts, ChangeSet, ReconcileContext};

use anyhow::Result;
use thiserror::Error;

use crate::model::{Connector, Iteration, Team, ValidationError};

/// Storage collaborator for the sync engine.
///
/// Each call is its own unit of work: `delete_iterations` and `save_changes`
/// either commit fully or not at all.
pub trait IterationStore {
    /// All local teams.
    fn load_teams(&self) -> Result<Vec<Team>>;

    /// Iterations previously synced for `(connector, system_id, project_id)`.
    fn load_project_iterations(
        &self,
        connector: Connector,
        system_id: &str,
        project_id: &str,
    ) -> Result<Vec<Iteration>>;

    /// Delete iterations by local id. Returns the number removed.
    fn delete_iterations(&self, iteration_ids: &[String]) -> Result<usize>;

    /// Commit a group's inserts and updates atomically.
    fn save_changes(&self, changes: &ChangeSet) -> Result<()>;
}

/// Why a sync run stopped.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An external record violated an iteration invariant.
    #[error("Project {project_id}: iteration {external_id} is invalid: {source}")]
    Validation {
        project_id: String,
        external_id: String,
        #[source]
        source: ValidationError,
    },

    /// Loading existing state failed.
    #[error("Failed to load {scope}: {source:#}")]
    Load {
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    /// Committing a group's changes failed.
    #[error("Project {project_id}: failed to save changes: {source:#}")]
    Persist {
        project_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Sync cancelled")]
    Cancelled,

    /// A fault that should never happen, caught at the engine boundary.
    #[error("Unexpected sync failure: {0}")]
    Unexpected(String),
}

/// Failed sync run, with the counters accumulated up to the failure.
///
/// Groups committed before the failure are included in `outcome`.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SyncFailure {
    #[source]
    pub error: SyncError,
    pub outcome: SyncOutcome,
}
