//! Iteration service: read access to synced iterations.

use crate::model::Iteration;
use crate::store::SyncDb;

use super::{CoreError, CoreResult};

/// Service for iteration queries.
pub struct IterationService<'a> {
    db: &'a SyncDb,
}

impl<'a> IterationService<'a> {
    pub(crate) const fn new(db: &'a SyncDb) -> Self {
        Self { db }
    }

    /// List iterations, optionally for one external project.
    pub fn list(&self, project_id: Option<&str>) -> CoreResult<Vec<Iteration>> {
        self.db
            .list_iterations(project_id)
            .map_err(CoreError::Internal)
    }

    /// Get a single iteration.
    ///
    /// Returns `Err(CoreError::IterationNotFound)` if it does not exist.
    pub fn get(&self, iteration_id: &str) -> CoreResult<Iteration> {
        self.db
            .get_iteration(iteration_id)
            .map_err(CoreError::Internal)?
            .ok_or_else(|| CoreError::IterationNotFound {
                iteration_id: iteration_id.to_string(),
            })
    }
}
