//! Teams, external team mappings, and the sprint classification rule.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{IterationKind, ParseEnumError};

/// How a team plans its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TeamKind {
    Scrum,
    Kanban,
}

impl TeamKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scrum => "scrum",
            Self::Kanban => "kanban",
        }
    }

    /// Whether this team kind can own sprints.
    #[must_use]
    pub const fn supports_sprints(self) -> bool {
        matches!(self, Self::Scrum)
    }
}

impl fmt::Display for TeamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scrum" => Ok(Self::Scrum),
            "kanban" => Ok(Self::Kanban),
            _ => Err(ParseEnumError::new("team kind", s)),
        }
    }
}

/// A local team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub kind: TeamKind,
}

/// Maps external team ids to internal team ids.
///
/// A missing entry and an entry mapped to `None` both mean "no team".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TeamMapping {
    entries: HashMap<String, Option<String>>,
}

impl TeamMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `external_team_id` to `internal_team_id`.
    pub fn insert(&mut self, external_team_id: impl Into<String>, internal_team_id: Option<String>) {
        self.entries.insert(external_team_id.into(), internal_team_id);
    }

    /// Internal team id for an external team id, if one is mapped.
    #[must_use]
    pub fn resolve(&self, external_team_id: &str) -> Option<&str> {
        self.entries.get(external_team_id)?.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for TeamMapping {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Lookup of local teams by id.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    teams: HashMap<String, Team>,
}

impl TeamDirectory {
    #[must_use]
    pub fn get(&self, team_id: &str) -> Option<&Team> {
        self.teams.get(team_id)
    }

    /// Resolve an external team id through `mapping` to a known local team.
    ///
    /// Returns `None` when the record has no team, the team is unmapped, or
    /// the mapped team does not exist locally.
    #[must_use]
    pub fn resolve(&self, mapping: &TeamMapping, external_team_id: Option<&str>) -> Option<&Team> {
        let internal = mapping.resolve(external_team_id?)?;
        self.get(internal)
    }
}

impl From<Vec<Team>> for TeamDirectory {
    fn from(teams: Vec<Team>) -> Self {
        Self {
            teams: teams.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

/// Classification an iteration actually gets once its team is known.
///
/// A requested `Sprint` is downgraded to `Iteration` unless the resolved
/// team exists and supports sprints.
#[must_use]
pub fn effective_kind(requested: IterationKind, team: Option<&Team>) -> IterationKind {
    match requested {
        IterationKind::Sprint if team.is_some_and(|t| t.kind.supports_sprints()) => {
            IterationKind::Sprint
        }
        IterationKind::Sprint | IterationKind::Iteration => IterationKind::Iteration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: &str, kind: TeamKind) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            kind,
        }
    }

    #[test]
    fn test_sprint_kept_for_scrum_team() {
        let scrum = team("t1", TeamKind::Scrum);
        assert_eq!(
            effective_kind(IterationKind::Sprint, Some(&scrum)),
            IterationKind::Sprint
        );
    }

    #[test]
    fn test_sprint_downgraded_for_kanban_team() {
        let kanban = team("t2", TeamKind::Kanban);
        assert_eq!(
            effective_kind(IterationKind::Sprint, Some(&kanban)),
            IterationKind::Iteration
        );
    }

    #[test]
    fn test_sprint_downgraded_without_team() {
        assert_eq!(
            effective_kind(IterationKind::Sprint, None),
            IterationKind::Iteration
        );
    }

    #[test]
    fn test_iteration_never_upgraded() {
        let scrum = team("t1", TeamKind::Scrum);
        assert_eq!(
            effective_kind(IterationKind::Iteration, Some(&scrum)),
            IterationKind::Iteration
        );
    }

    #[test]
    fn test_directory_resolution() {
        let directory = TeamDirectory::from(vec![team("t1", TeamKind::Scrum)]);
        let mapping: TeamMapping = [
            ("ext-a", Some("t1".to_string())),
            ("ext-b", None),
            ("ext-c", Some("missing".to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(directory.resolve(&mapping, Some("ext-a")).map(|t| t.id.as_str()), Some("t1"));
        assert!(directory.resolve(&mapping, Some("ext-b")).is_none());
        assert!(directory.resolve(&mapping, Some("ext-c")).is_none());
        assert!(directory.resolve(&mapping, Some("ext-unknown")).is_none());
        assert!(directory.resolve(&mapping, None).is_none());
    }

    #[test]
    fn test_mapping_deserializes_nulls() {
        let mapping: TeamMapping =
            serde_json::from_str(r#"{"ext-a": "t1", "ext-b": null}"#).unwrap();
        assert_eq!(mapping.resolve("ext-a"), Some("t1"));
        assert_eq!(mapping.resolve("ext-b"), None);
        assert_eq!(mapping.len(), 2);
    }
}
