//! Local canonical model for externally synced work-tracking data.
//!
//! Iterations are the sync target. Each one carries an [`OwnershipInfo`]
//! binding it to the connector, system and external id that produced it,
//! plus an [`ExternalMetadata`] set copied from the external record.

pub mod external;
pub mod ids;
pub mod iteration;
pub mod metadata;
pub mod ownership;
pub mod team;

pub use external::{ExternalIteration, ExternalIterationMetadata, SyncCommand};
pub use ids::{is_iteration_id, new_iteration_id};
pub use iteration::{DateRange, Iteration, IterationFields, IterationKind, IterationState};
pub use metadata::{ExternalMetadata, MetadataEntry, MetadataKey};
pub use ownership::{Connector, OwnershipInfo};
pub use team::{effective_kind, Team, TeamDirectory, TeamKind, TeamMapping};

use chrono::NaiveDate;
use thiserror::Error;

/// A string did not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {kind} value: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// An aggregate invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("External id must not be blank")]
    BlankExternalId,

    #[error("Iteration name must not be blank")]
    BlankName,

    #[error("Iteration name is {actual} characters, the limit is {max}")]
    NameTooLong { max: usize, actual: usize },

    #[error("Iteration starts on {start} but ends on {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Metadata key '{0}' is set at creation and cannot be changed")]
    ImmutableMetadata(MetadataKey),
}
