//! Team service: register and list local teams.

use anyhow::anyhow;

use crate::model::{Team, TeamKind};
use crate::store::SyncDb;

use super::{CoreError, CoreResult};

/// Service for team operations.
pub struct TeamService<'a> {
    db: &'a SyncDb,
}

impl<'a> TeamService<'a> {
    pub(crate) const fn new(db: &'a SyncDb) -> Self {
        Self { db }
    }

    pub fn list(&self) -> CoreResult<Vec<Team>> {
        self.db.list_teams().map_err(CoreError::Internal)
    }

    /// Register a team, or replace the name and kind of an existing one.
    pub fn upsert(&self, id: &str, name: &str, kind: TeamKind) -> CoreResult<Team> {
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(CoreError::Internal(anyhow!("Team id and name must not be blank")));
        }
        let team = Team {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        };
        self.db.upsert_team(&team)?;
        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_list() {
        let db = SyncDb::open_in_memory().unwrap();
        let teams = TeamService::new(&db);

        teams.upsert("t1", "Platform", TeamKind::Scrum).unwrap();
        teams.upsert("t1", "Platform", TeamKind::Kanban).unwrap();

        let listed = teams.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, TeamKind::Kanban);
    }

    #[test]
    fn test_upsert_rejects_blank() {
        let db = SyncDb::open_in_memory().unwrap();
        let teams = TeamService::new(&db);
        assert!(teams.upsert("t1", "  ", TeamKind::Scrum).is_err());
        assert!(teams.upsert("", "Platform", TeamKind::Scrum).is_err());
        assert!(teams.list().unwrap().is_empty());
    }
}
