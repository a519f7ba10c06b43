//! Command-line interface definitions.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use worksync_core::model::TeamKind;

use crate::output::OutputFormat;

/// Reconcile iterations from external work-tracking systems into a local store
#[derive(Debug, Parser)]
#[command(name = "worksync", version, about)]
pub struct Cli {
    /// Path to the SQLite database (overrides WORKSYNC_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the deletion outbox (overrides WORKSYNC_OUTBOX)
    #[arg(long, global = true)]
    pub outbox: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Log output format (filter with WORKSYNC_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Manage local teams
    #[command(subcommand)]
    Teams(TeamsCommands),

    /// Inspect synced iterations
    #[command(subcommand)]
    Iterations(IterationsCommands),

    /// Reconcile a batch of external iterations
    Sync {
        /// JSON sync command file, or '-' for stdin
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Show the last sync run per system
    Status {
        /// Only show this system
        #[arg(long)]
        system: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TeamsCommands {
    /// Register a team or update an existing one
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        kind: TeamKind,
    },

    /// List teams
    List,
}

#[derive(Debug, Subcommand)]
pub enum IterationsCommands {
    /// List iterations
    List {
        /// Only iterations of this external project
        #[arg(long)]
        project: Option<String>,
    },

    /// Show one iteration with its metadata
    Show {
        /// Local iteration id
        id: String,
    },
}
