//! External metadata attached to synced iterations.
//!
//! Keys are a closed set. Identity keys (`Identifier`, `ProjectId`) are
//! written once when the iteration is created; `Path` is refreshed on every
//! sync pass.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{ParseEnumError, ValidationError};

/// Known metadata keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetadataKey {
    /// Numeric identifier assigned by the external system.
    Identifier,
    /// External project the iteration belongs to.
    ProjectId,
    /// Iteration path (e.g. `Project\Release 1\Sprint 3`).
    Path,
}

impl MetadataKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "Identifier",
            Self::ProjectId => "ProjectId",
            Self::Path => "Path",
        }
    }

    /// Whether a sync pass may rewrite this key after creation.
    #[must_use]
    pub const fn is_mutable(self) -> bool {
        matches!(self, Self::Path)
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Identifier" => Ok(Self::Identifier),
            "ProjectId" => Ok(Self::ProjectId),
            "Path" => Ok(Self::Path),
            other => Err(ParseEnumError::new("metadata key", other)),
        }
    }
}

/// A single `(key, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub key: MetadataKey,
    pub value: String,
}

/// Ordered metadata set. Each key appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExternalMetadata {
    entries: Vec<MetadataEntry>,
}

impl ExternalMetadata {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Full metadata set for a newly created iteration.
    pub fn for_new_iteration(
        identifier: impl Into<String>,
        project_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let mut metadata = Self::new();
        metadata.upsert(MetadataKey::Identifier, identifier);
        metadata.upsert(MetadataKey::ProjectId, project_id);
        metadata.upsert(MetadataKey::Path, path);
        metadata
    }

    #[must_use]
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set `key` to `value`, keeping its position if already present.
    ///
    /// Returns `true` if the set changed.
    pub fn upsert(&mut self, key: MetadataKey, value: impl Into<String>) -> bool {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            if entry.value == value {
                return false;
            }
            entry.value = value;
            return true;
        }
        self.entries.push(MetadataEntry { key, value });
        true
    }

    /// Like [`upsert`](Self::upsert), but only for keys that may change after
    /// creation.
    pub fn upsert_mutable(
        &mut self,
        key: MetadataKey,
        value: impl Into<String>,
    ) -> Result<bool, ValidationError> {
        if !key.is_mutable() {
            return Err(ValidationError::ImmutableMetadata(key));
        }
        Ok(self.upsert(key, value))
    }
}

impl FromIterator<MetadataEntry> for ExternalMetadata {
    fn from_iter<I: IntoIterator<Item = MetadataEntry>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for entry in iter {
            metadata.upsert(entry.key, entry.value);
        }
        metadata
    }
}
