//! Service layer for worksync-core.
//!
//! Provides typed, high-level APIs for team, iteration, and sync operations.
//! The service layer hides database setup, the outbox, and sync locking
//! behind a small interface.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use worksync_core::config::Settings;
//! use worksync_core::core::CoreContext;
//!
//! let settings = Settings::resolve(Path::new("/work"), None, None);
//! let ctx = CoreContext::new(settings);
//!
//! let services = ctx.services().unwrap();
//! let iterations = services.iterations().list(None).unwrap();
//! ```

pub mod errors;
pub mod iterations;
pub mod sync;
pub mod teams;

pub use errors::{CoreError, CoreResult};

use std::path::Path;

use crate::config::Settings;
use crate::store::SyncDb;

/// Context for worksync-core services.
///
/// Holds the resolved file locations. Create one per operation or hold for
/// the duration of a session.
#[derive(Debug, Clone)]
pub struct CoreContext {
    settings: Settings,
}

impl CoreContext {
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.settings.db_path
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.settings.db_path.exists()
    }

    /// Create the database and its schema. Safe to run more than once.
    pub fn init(&self) -> CoreResult<()> {
        let db = SyncDb::open(&self.settings.db_path)?;
        db.init_schema()?;
        Ok(())
    }

    /// Open an existing database.
    ///
    /// Returns `Err(CoreError::NotInitialized)` if the database file is
    /// missing; run [`CoreContext::init`] first.
    pub fn open_db(&self) -> CoreResult<SyncDb> {
        if !self.is_initialized() {
            return Err(CoreError::NotInitialized {
                path: self.settings.db_path.display().to_string(),
            });
        }
        let db = SyncDb::open(&self.settings.db_path)?;
        db.init_schema()?;
        Ok(db)
    }

    /// Create a `WorksyncServices` instance backed by this context.
    pub fn services(&self) -> CoreResult<WorksyncServices> {
        let db = self.open_db()?;
        Ok(WorksyncServices {
            ctx: self.clone(),
            db,
        })
    }
}

/// Facade providing all worksync service APIs.
pub struct WorksyncServices {
    ctx: CoreContext,
    db: SyncDb,
}

impl WorksyncServices {
    /// Access team operations.
    #[must_use]
    pub const fn teams(&self) -> teams::TeamService<'_> {
        teams::TeamService::new(&self.db)
    }

    /// Access iteration queries.
    #[must_use]
    pub const fn iterations(&self) -> iterations::IterationService<'_> {
        iterations::IterationService::new(&self.db)
    }

    /// Access sync operations.
    #[must_use]
    pub const fn sync(&self) -> sync::SyncService<'_> {
        sync::SyncService::new(&self.ctx, &self.db)
    }

    /// Get a reference to the underlying database.
    #[must_use]
    pub const fn db(&self) -> &SyncDb {
        &self.db
    }

    #[must_use]
    pub const fn context(&self) -> &CoreContext {
        &self.ctx
    }
}
