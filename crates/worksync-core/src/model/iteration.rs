//! The iteration aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    new_iteration_id, ExternalMetadata, MetadataKey, OwnershipInfo, ParseEnumError,
    ValidationError,
};

/// Longest accepted iteration name, in characters.
pub const MAX_NAME_LEN: usize = 128;

/// Type classification of an iteration.
///
/// `Sprint` is team-exclusive: only teams whose kind supports sprints may
/// own one. Everything else is a plain `Iteration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IterationKind {
    Sprint,
    Iteration,
}

impl IterationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sprint => "sprint",
            Self::Iteration => "iteration",
        }
    }
}

impl fmt::Display for IterationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IterationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sprint" => Ok(Self::Sprint),
            "iteration" => Ok(Self::Iteration),
            _ => Err(ParseEnumError::new("iteration kind", s)),
        }
    }
}

/// Lifecycle state reported by the external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationState {
    Past,
    Current,
    Future,
}

impl IterationState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Current => "current",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for IterationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IterationState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "past" => Ok(Self::Past),
            "current" => Ok(Self::Current),
            "future" => Ok(Self::Future),
            _ => Err(ParseEnumError::new("iteration state", s)),
        }
    }
}

/// Optional start and end dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(ValidationError::InvertedDateRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// The externally sourced fields of an iteration that a sync pass may set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationFields {
    pub name: String,
    pub kind: IterationKind,
    pub state: IterationState,
    pub date_range: DateRange,
    pub team_id: Option<String>,
}

impl IterationFields {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                max: MAX_NAME_LEN,
                actual: len,
            });
        }
        self.date_range.validate()
    }
}

/// A locally stored iteration managed by an external system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Iteration {
    pub id: String,
    pub name: String,
    pub kind: IterationKind,
    pub state: IterationState,
    pub date_range: DateRange,
    pub team_id: Option<String>,
    pub ownership: OwnershipInfo,
    pub metadata: ExternalMetadata,
}

impl Iteration {
    /// Create a new iteration with a freshly minted local id.
    pub fn create(
        fields: IterationFields,
        ownership: OwnershipInfo,
        metadata: ExternalMetadata,
    ) -> Result<Self, ValidationError> {
        fields.validate()?;
        Ok(Self {
            id: new_iteration_id(),
            name: fields.name,
            kind: fields.kind,
            state: fields.state,
            date_range: fields.date_range,
            team_id: fields.team_id,
            ownership,
            metadata,
        })
    }

    /// Overwrite the externally sourced fields.
    ///
    /// Validation runs before any field is touched, so a rejected update
    /// leaves the iteration as it was. Returns `true` if anything changed.
    pub fn apply_update(&mut self, fields: IterationFields) -> Result<bool, ValidationError> {
        fields.validate()?;

        let changed = self.name != fields.name
            || self.kind != fields.kind
            || self.state != fields.state
            || self.date_range != fields.date_range
            || self.team_id != fields.team_id;

        if changed {
            self.name = fields.name;
            self.kind = fields.kind;
            self.state = fields.state;
            self.date_range = fields.date_range;
            self.team_id = fields.team_id;
        }
        Ok(changed)
    }

    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.ownership.external_id
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.metadata.get(MetadataKey::ProjectId)
    }
}
