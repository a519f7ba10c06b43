//! SQLite store for synced iterations.
//!
//! Holds the local canonical iterations, their external metadata, the team
//! directory, and per-system sync state. Implements [`IterationStore`] for
//! the sync engine: every write method runs in its own transaction.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]

mod query;

pub use query::{IterationSummary, SyncState};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, ToSql};

use crate::model::{
    Connector, DateRange, ExternalMetadata, Iteration, MetadataEntry, OwnershipInfo, Team,
};
use crate::sync::{ChangeSet, IterationStore, SyncOutcome};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database of synced state.
pub struct SyncDb {
    conn: Connection,
}

impl SyncDb {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directories: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create all tables and indexes if they don't exist.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Insert or replace a team.
    pub fn upsert_team(&self, team: &Team) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO teams (team_id, name, kind) VALUES (?, ?, ?)
                 ON CONFLICT (team_id) DO UPDATE SET
                     name = excluded.name,
                     kind = excluded.kind",
                params![team.id, team.name, team.kind.as_str()],
            )
            .with_context(|| format!("Failed to upsert team {}", team.id))?;
        Ok(())
    }

    /// Record the result of a sync run for `system_id`.
    pub fn record_sync_run(
        &self,
        system_id: &str,
        status: &str,
        outcome: &SyncOutcome,
        error: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO sync_state (
                    system_id, last_sync_ts, status, requested, created, updated,
                    unchanged, deleted, last_external_id, last_error
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (system_id) DO UPDATE SET
                    last_sync_ts = excluded.last_sync_ts,
                    status = excluded.status,
                    requested = excluded.requested,
                    created = excluded.created,
                    updated = excluded.updated,
                    unchanged = excluded.unchanged,
                    deleted = excluded.deleted,
                    last_external_id = excluded.last_external_id,
                    last_error = excluded.last_error",
                params![
                    system_id,
                    now,
                    status,
                    outcome.requested as i64,
                    outcome.created as i64,
                    outcome.updated as i64,
                    outcome.unchanged as i64,
                    outcome.deleted as i64,
                    outcome.last_external_id,
                    error,
                ],
            )
            .context("Failed to update sync_state")?;
        Ok(())
    }
}

impl IterationStore for SyncDb {
    fn load_teams(&self) -> Result<Vec<Team>> {
        self.list_teams()
    }

    fn load_project_iterations(
        &self,
        connector: Connector,
        system_id: &str,
        project_id: &str,
    ) -> Result<Vec<Iteration>> {
        select_iterations(
            &self.conn,
            "connector = ?1 AND system_id = ?2 AND project_id = ?3",
            params![connector.as_str(), system_id, project_id],
        )
        .with_context(|| format!("Failed to load iterations for project {project_id}"))
    }

    fn delete_iterations(&self, iteration_ids: &[String]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin delete transaction")?;

        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM iterations WHERE iteration_id = ?")?;
            for id in iteration_ids {
                deleted += stmt
                    .execute(params![id])
                    .with_context(|| format!("Failed to delete iteration {id}"))?;
            }
        }

        tx.commit().context("Failed to commit deletes")?;
        Ok(deleted)
    }

    fn save_changes(&self, changes: &ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        for iteration in &changes.inserted {
            insert_iteration(&tx, iteration)
                .with_context(|| format!("Failed to insert iteration {}", iteration.id))?;
        }
        for iteration in &changes.updated {
            update_iteration(&tx, iteration)
                .with_context(|| format!("Failed to update iteration {}", iteration.id))?;
        }

        tx.commit().context("Failed to commit transaction")?;
        Ok(())
    }
}

// ============================================================================
// Row mapping
// ============================================================================

struct IterationRow {
    id: String,
    name: String,
    kind: String,
    state: String,
    start_date: Option<String>,
    end_date: Option<String>,
    team_id: Option<String>,
    connector: String,
    system_id: String,
    external_id: String,
}

impl IterationRow {
    fn into_iteration(self, metadata: ExternalMetadata) -> Result<Iteration> {
        Ok(Iteration {
            kind: self.kind.parse()?,
            state: self.state.parse()?,
            date_range: DateRange::new(
                parse_date(self.start_date.as_deref())?,
                parse_date(self.end_date.as_deref())?,
            ),
            ownership: OwnershipInfo::new(
                self.connector.parse::<Connector>()?,
                self.system_id,
                self.external_id,
            ),
            id: self.id,
            name: self.name,
            team_id: self.team_id,
            metadata,
        })
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .with_context(|| format!("Invalid stored date: {s}"))
        })
        .transpose()
}

fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Load iterations matching `filter` (a SQL condition on `iterations`),
/// together with their metadata.
fn select_iterations(
    conn: &Connection,
    filter: &str,
    filter_params: &[&dyn ToSql],
) -> Result<Vec<Iteration>> {
    let mut metadata: HashMap<String, Vec<MetadataEntry>> = HashMap::new();
    {
        let mut stmt = conn.prepare(&format!(
            "SELECT iteration_id, name, value FROM iteration_metadata
             WHERE iteration_id IN (SELECT iteration_id FROM iterations WHERE {filter})
             ORDER BY iteration_id, position"
        ))?;
        let rows = stmt.query_map(filter_params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (iteration_id, key, value) = row?;
            metadata.entry(iteration_id).or_default().push(MetadataEntry {
                key: key.parse()?,
                value,
            });
        }
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT iteration_id, name, kind, state, start_date, end_date, team_id,
                connector, system_id, external_id
         FROM iterations WHERE {filter}
         ORDER BY project_id, external_id, iteration_id"
    ))?;
    let rows = stmt.query_map(filter_params, |row| {
        Ok(IterationRow {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            state: row.get(3)?,
            start_date: row.get(4)?,
            end_date: row.get(5)?,
            team_id: row.get(6)?,
            connector: row.get(7)?,
            system_id: row.get(8)?,
            external_id: row.get(9)?,
        })
    })?;

    let mut iterations = Vec::new();
    for row in rows {
        let row = row?;
        let entries = metadata.remove(&row.id).unwrap_or_default();
        iterations.push(row.into_iteration(entries.into_iter().collect())?);
    }
    Ok(iterations)
}

fn insert_iteration(conn: &Connection, iteration: &Iteration) -> Result<()> {
    let Some(project_id) = iteration.project_id() else {
        bail!("Iteration {} has no ProjectId metadata", iteration.id);
    };

    conn.execute(
        "INSERT INTO iterations (
            iteration_id, name, kind, state, start_date, end_date, team_id,
            connector, system_id, external_id, project_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            iteration.id,
            iteration.name,
            iteration.kind.as_str(),
            iteration.state.as_str(),
            format_date(iteration.date_range.start),
            format_date(iteration.date_range.end),
            iteration.team_id,
            iteration.ownership.connector.as_str(),
            iteration.ownership.system_id,
            iteration.ownership.external_id,
            project_id,
        ],
    )?;

    for (position, entry) in iteration.metadata.iter().enumerate() {
        conn.execute(
            "INSERT INTO iteration_metadata (iteration_id, position, name, value)
             VALUES (?, ?, ?, ?)",
            params![iteration.id, position as i64, entry.key.as_str(), entry.value],
        )?;
    }
    Ok(())
}

fn update_iteration(conn: &Connection, iteration: &Iteration) -> Result<()> {
    let changed = conn.execute(
        "UPDATE iterations SET
            name = ?,
            kind = ?,
            state = ?,
            start_date = ?,
            end_date = ?,
            team_id = ?
        WHERE iteration_id = ?",
        params![
            iteration.name,
            iteration.kind.as_str(),
            iteration.state.as_str(),
            format_date(iteration.date_range.start),
            format_date(iteration.date_range.end),
            iteration.team_id,
            iteration.id,
        ],
    )?;
    if changed == 0 {
        bail!("Iteration {} no longer exists", iteration.id);
    }

    // Identity keys are written once on insert and never touched here.
    for (position, entry) in iteration.metadata.iter().enumerate() {
        if !entry.key.is_mutable() {
            continue;
        }
        conn.execute(
            "INSERT INTO iteration_metadata (iteration_id, position, name, value)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (iteration_id, name) DO UPDATE SET value = excluded.value",
            params![iteration.id, position as i64, entry.key.as_str(), entry.value],
        )?;
    }
    Ok(())
}

// ============================================================================
// Schema SQL
// ============================================================================

const SCHEMA_SQL: &str = r"
-- TEAMS
CREATE TABLE IF NOT EXISTS teams (
    team_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('scrum', 'kanban'))
);

-- ITERATIONS
CREATE TABLE IF NOT EXISTS iterations (
    iteration_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('sprint', 'iteration')),
    state TEXT NOT NULL CHECK (state IN ('past', 'current', 'future')),
    start_date TEXT,
    end_date TEXT,
    team_id TEXT REFERENCES teams(team_id) ON DELETE SET NULL,
    connector TEXT NOT NULL,
    system_id TEXT NOT NULL,
    external_id TEXT NOT NULL,
    project_id TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_iterations_external
    ON iterations(connector, system_id, project_id, external_id)
    WHERE external_id <> '';
CREATE INDEX IF NOT EXISTS idx_iterations_team ON iterations(team_id);

-- ITERATION METADATA
CREATE TABLE IF NOT EXISTS iteration_metadata (
    iteration_id TEXT NOT NULL REFERENCES iterations(iteration_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (iteration_id, name)
);

-- SYNC STATE
CREATE TABLE IF NOT EXISTS sync_state (
    system_id TEXT PRIMARY KEY,
    last_sync_ts TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('succeeded', 'failed', 'cancelled')),
    requested INTEGER NOT NULL DEFAULT 0,
    created INTEGER NOT NULL DEFAULT 0,
    updated INTEGER NOT NULL DEFAULT 0,
    unchanged INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    last_external_id TEXT,
    last_error TEXT
);
";

// ============================================================================
// Tests
// ============================================================================
