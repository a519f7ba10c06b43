//! Path resolution for the database and the outbox.
//!
//! Each setting resolves in order: explicit override (CLI flag), environment
//! variable, then a default under `.worksync/` in the working root.

use std::env;
use std::path::{Path, PathBuf};

/// Data directory created under the working root.
pub const DATA_DIR: &str = ".worksync";

pub const DB_VAR: &str = "WORKSYNC_DB";
pub const OUTBOX_VAR: &str = "WORKSYNC_OUTBOX";

const DB_FILE: &str = "worksync.db";
const OUTBOX_FILE: &str = "outbox.jsonl";

/// Resolved file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub outbox_path: PathBuf,
}

impl Settings {
    /// Resolve settings against the process environment.
    pub fn resolve(root: &Path, db: Option<&Path>, outbox: Option<&Path>) -> Self {
        Self::resolve_with(root, db, outbox, |var| env::var(var).ok())
    }

    /// Resolve settings with a custom variable lookup.
    pub fn resolve_with<F>(root: &Path, db: Option<&Path>, outbox: Option<&Path>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<&Path>, var: &str, file: &str| {
            explicit
                .map(Path::to_path_buf)
                .or_else(|| lookup(var).filter(|v| !v.is_empty()).map(PathBuf::from))
                .map_or_else(|| root.join(DATA_DIR).join(file), |p| absolutize(root, p))
        };

        Self {
            db_path: pick(db, DB_VAR, DB_FILE),
            outbox_path: pick(outbox, OUTBOX_VAR, OUTBOX_FILE),
        }
    }

    /// Lock file used to serialize syncs against this database.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.db_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

fn absolutize(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
