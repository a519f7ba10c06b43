//! Typed error types for the worksync-core service layer.

use thiserror::Error;

/// Result type alias for core service operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the worksync-core service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The database has not been created yet.
    #[error("No worksync database at {path}. Run 'worksync init' first.")]
    NotInitialized { path: String },

    /// An iteration was not found.
    #[error("Iteration not found: {iteration_id}")]
    IterationNotFound { iteration_id: String },

    /// Another sync holds the lock for this database.
    #[error("A sync is already running against {path}")]
    SyncInProgress { path: String },

    /// The sync command could not be parsed.
    #[error("Invalid sync command: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    /// An internal storage or database error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
