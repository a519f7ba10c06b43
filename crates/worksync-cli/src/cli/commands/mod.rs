//! Command implementations.

pub mod helpers;
pub mod init;
pub mod iterations;
pub mod status;
pub mod sync;
pub mod teams;

pub use init::run_init;
pub use iterations::{run_iterations_list, run_iterations_show};
pub use status::run_status;
pub use sync::run_sync;
pub use teams::{run_teams_add, run_teams_list};
