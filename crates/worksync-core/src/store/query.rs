//! Read API for the sync database.
//!
//! All result types implement Serialize for CLI output.

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::{select_iterations, SyncDb};
use crate::model::{Iteration, MetadataKey, Team};

// ============================================================================
// Query Result Types
// ============================================================================

/// Flat view of an iteration for list output.
#[derive(Debug, Clone, Serialize)]
pub struct IterationSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub state: String,
    pub project_id: Option<String>,
    pub external_id: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub team_id: Option<String>,
    pub path: Option<String>,
}

impl From<&Iteration> for IterationSummary {
    fn from(iteration: &Iteration) -> Self {
        Self {
            id: iteration.id.clone(),
            name: iteration.name.clone(),
            kind: iteration.kind.to_string(),
            state: iteration.state.to_string(),
            project_id: iteration.project_id().map(str::to_string),
            external_id: iteration.ownership.external_id.clone(),
            start: iteration.date_range.start.map(|d| d.to_string()),
            end: iteration.date_range.end.map(|d| d.to_string()),
            team_id: iteration.team_id.clone(),
            path: iteration.metadata.get(MetadataKey::Path).map(str::to_string),
        }
    }
}

/// Last recorded sync run for a system.
#[derive(Debug, Clone, Serialize)]
pub struct SyncState {
    pub system_id: String,
    pub last_sync_ts: String,
    pub status: String,
    pub requested: i64,
    pub created: i64,
    pub updated: i64,
    pub unchanged: i64,
    pub deleted: i64,
    pub last_external_id: Option<String>,
    pub last_error: Option<String>,
}

impl SyncState {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            system_id: row.get(0)?,
            last_sync_ts: row.get(1)?,
            status: row.get(2)?,
            requested: row.get(3)?,
            created: row.get(4)?,
            updated: row.get(5)?,
            unchanged: row.get(6)?,
            deleted: row.get(7)?,
            last_external_id: row.get(8)?,
            last_error: row.get(9)?,
        })
    }
}

const SYNC_STATE_COLUMNS: &str = "system_id, last_sync_ts, status, requested, created, updated,
     unchanged, deleted, last_external_id, last_error";

// ============================================================================
// Queries
// ============================================================================

impl SyncDb {
    /// All teams, ordered by id.
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT team_id, name, kind FROM teams ORDER BY team_id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut teams = Vec::new();
        for row in rows {
            let (id, name, kind) = row.context("Failed to read team row")?;
            teams.push(Team {
                kind: kind.parse()?,
                id,
                name,
            });
        }
        Ok(teams)
    }

    /// Iterations, optionally restricted to one external project.
    pub fn list_iterations(&self, project_id: Option<&str>) -> Result<Vec<Iteration>> {
        match project_id {
            Some(project_id) => {
                select_iterations(&self.conn, "project_id = ?1", params![project_id])
            }
            None => select_iterations(&self.conn, "1 = 1", params![]),
        }
        .context("Failed to list iterations")
    }

    /// Look up one iteration by local id.
    pub fn get_iteration(&self, iteration_id: &str) -> Result<Option<Iteration>> {
        let mut found = select_iterations(&self.conn, "iteration_id = ?1", params![iteration_id])
            .with_context(|| format!("Failed to load iteration {iteration_id}"))?;
        Ok(found.pop())
    }

    /// Last sync run for one system.
    pub fn get_sync_state(&self, system_id: &str) -> Result<Option<SyncState>> {
        self.conn
            .query_row(
                &format!("SELECT {SYNC_STATE_COLUMNS} FROM sync_state WHERE system_id = ?"),
                params![system_id],
                SyncState::from_row,
            )
            .optional()
            .context("Failed to query sync_state")
    }

    /// Last sync run for every system, ordered by system id.
    pub fn list_sync_states(&self) -> Result<Vec<SyncState>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SYNC_STATE_COLUMNS} FROM sync_state ORDER BY system_id"
        ))?;
        let rows = stmt.query_map([], SyncState::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to query sync_state")
    }
}

// ============================================================================
// Tests
// ============================================================================
