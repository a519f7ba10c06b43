//! Implementation of `worksync init`.

use anyhow::Result;
use serde::Serialize;

use crate::output::{Formatter, OutputFormat};
use worksync_core::core::CoreContext;

#[derive(Serialize)]
struct InitOutput {
    db: String,
    outbox: String,
    created: bool,
}

/// Create the database. Running it again only re-applies the schema.
#[tracing::instrument(skip(ctx, format))]
pub fn run_init(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    let created = !ctx.is_initialized();
    ctx.init()?;

    Formatter::new(format).print(&InitOutput {
        db: ctx.db_path().display().to_string(),
        outbox: ctx.settings().outbox_path.display().to_string(),
        created,
    })
}
