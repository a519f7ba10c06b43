//! Implementation of `worksync teams` commands.

use anyhow::Result;

use crate::cli::commands::helpers::open_services;
use crate::output::{Formatter, OutputFormat};
use worksync_core::core::CoreContext;
use worksync_core::model::TeamKind;

#[tracing::instrument(skip(ctx, format))]
pub fn run_teams_add(
    ctx: &CoreContext,
    id: &str,
    name: &str,
    kind: TeamKind,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let team = services.teams().upsert(id, name, kind)?;
    Formatter::new(format).print(&team)
}

#[tracing::instrument(skip(ctx, format))]
pub fn run_teams_list(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let teams = services.teams().list()?;
    Formatter::new(format).print_list(
        &teams,
        "No teams. Add one with: worksync teams add --id <id> --name <name> --kind scrum|kanban",
        "teams",
    )
}
