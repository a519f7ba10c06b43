//! worksync-core: reconciliation of externally sourced iterations.
//!
//! This crate owns the iteration domain model, the sync engine, the SQLite
//! store, the deletion outbox, and the service layer used by the CLI.

pub mod config;
pub mod core;
pub mod model;
pub mod outbox;
pub mod store;
pub mod sync;
