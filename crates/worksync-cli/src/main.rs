//! worksync: reconcile external iterations into a local SQLite store.

mod cli;
mod output;

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use signal_hook::consts::SIGINT;
use tracing_subscriber::EnvFilter;

use crate::cli::commands::helpers::read_input;
use crate::cli::commands::{
    run_init, run_iterations_list, run_iterations_show, run_status, run_sync, run_teams_add,
    run_teams_list,
};
use crate::cli::{Cli, Commands, IterationsCommands, LogFormat, TeamsCommands};
use worksync_core::config::Settings;
use worksync_core::core::CoreContext;
use worksync_core::sync::CancellationToken;

/// Environment variable holding the log filter.
const LOG_VAR: &str = "WORKSYNC_LOG";

/// Route SIGINT into a cancellation token so a running sync stops between
/// project groups instead of mid-commit.
///
/// Register only once input has been read: until then SIGINT keeps its
/// default action and terminates a blocked read.
fn interrupt_token() -> Result<CancellationToken> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&flag))
        .context("Failed to install SIGINT handler")?;
    Ok(CancellationToken::from_flag(flag))
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .with_env_var(LOG_VAR)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let root = std::env::current_dir().context("Failed to resolve working directory")?;
    let ctx = CoreContext::new(Settings::resolve(
        &root,
        cli.db.as_deref(),
        cli.outbox.as_deref(),
    ));
    let format = cli.output_format();

    match cli.command {
        Commands::Init => {
            run_init(&ctx, format)?;
        }

        Commands::Teams(cmd) => match cmd {
            TeamsCommands::Add { id, name, kind } => {
                run_teams_add(&ctx, &id, &name, kind, format)?;
            }
            TeamsCommands::List => {
                run_teams_list(&ctx, format)?;
            }
        },

        Commands::Iterations(cmd) => match cmd {
            IterationsCommands::List { project } => {
                run_iterations_list(&ctx, project.as_deref(), format)?;
            }
            IterationsCommands::Show { id } => {
                run_iterations_show(&ctx, &id, format)?;
            }
        },

        Commands::Sync { input } => {
            let json = read_input(&input)?;
            let cancel = interrupt_token()?;
            return run_sync(&ctx, &json, &cancel, format);
        }

        Commands::Status { system } => {
            run_status(&ctx, system.as_deref(), format)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigint_cancels_token() {
        let cancel = interrupt_token().unwrap();
        assert!(!cancel.is_cancelled());

        signal_hook::low_level::raise(SIGINT).unwrap();

        assert!(cancel.is_cancelled());
    }
}
