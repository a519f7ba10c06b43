//! Inbound sync command and external iteration records.
//!
//! Records arrive already fetched and paginated. Classification and state
//! are closed enums, so an unrecognized value fails deserialization instead
//! of silently defaulting.

use serde::Deserialize;

use super::{DateRange, IterationKind, IterationState, TeamMapping};

/// A request to reconcile one system's iterations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCommand {
    /// External system (connection) the records came from.
    pub system_id: String,
    #[serde(default)]
    pub records: Vec<ExternalIteration>,
    #[serde(default)]
    pub team_mappings: TeamMapping,
}

impl SyncCommand {
    pub fn new(system_id: impl Into<String>, records: Vec<ExternalIteration>) -> Self {
        Self {
            system_id: system_id.into(),
            records,
            team_mappings: TeamMapping::default(),
        }
    }

    #[must_use]
    pub fn with_team_mappings(mut self, team_mappings: TeamMapping) -> Self {
        self.team_mappings = team_mappings;
        self
    }

    /// Parse a command from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One iteration as reported by the external system.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIteration {
    pub external_id: String,
    pub project_id: String,
    pub name: String,
    pub type_classification: IterationKind,
    pub lifecycle_state: IterationState,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub team_id: Option<String>,
    pub metadata: ExternalIterationMetadata,
}

/// Raw metadata fields carried by an external iteration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalIterationMetadata {
    pub identifier: String,
    pub path: String,
}
