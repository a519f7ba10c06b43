//! Ownership binding between local records and external systems.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// External connector that produced a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connector {
    #[default]
    AzureDevOps,
}

impl Connector {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AzureDevOps => "azure-devops",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "azure-devops" => Ok(Self::AzureDevOps),
            other => Err(ParseEnumError::new("connector", other)),
        }
    }
}

/// Marks a local record as managed by an external system.
///
/// For externally owned records, `external_id` is unique within
/// `(connector, system_id, project)`. The store enforces this with a unique
/// index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OwnershipInfo {
    pub connector: Connector,
    pub system_id: String,
    pub external_id: String,
}

impl OwnershipInfo {
    pub fn new(
        connector: Connector,
        system_id: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            system_id: system_id.into(),
            external_id: external_id.into(),
        }
    }

    /// Whether this binding carries a usable external id.
    #[must_use]
    pub fn is_external(&self) -> bool {
        !self.external_id.is_empty()
    }
}
