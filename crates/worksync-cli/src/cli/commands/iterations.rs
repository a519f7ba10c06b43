//! Implementation of `worksync iterations` commands.

use anyhow::Result;

use crate::cli::commands::helpers::open_services;
use crate::output::{Formatter, OutputFormat};
use worksync_core::core::CoreContext;
use worksync_core::store::IterationSummary;

#[tracing::instrument(skip(ctx, format))]
pub fn run_iterations_list(
    ctx: &CoreContext,
    project: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let summaries: Vec<IterationSummary> = services
        .iterations()
        .list(project)?
        .iter()
        .map(IterationSummary::from)
        .collect();

    Formatter::new(format).print_list(
        &summaries,
        "No iterations. Run 'worksync sync --input <file>' to import some.",
        "iterations",
    )
}

#[tracing::instrument(skip(ctx, format))]
pub fn run_iterations_show(ctx: &CoreContext, iteration_id: &str, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let iteration = services.iterations().get(iteration_id)?;
    Formatter::new(format).print(&iteration)
}
