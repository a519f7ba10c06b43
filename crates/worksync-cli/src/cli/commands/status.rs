//! Implementation of `worksync status`.

use anyhow::Result;

use crate::cli::commands::helpers::open_services;
use crate::output::{Formatter, OutputFormat};
use worksync_core::core::CoreContext;

#[tracing::instrument(skip(ctx, format))]
pub fn run_status(ctx: &CoreContext, system: Option<&str>, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let states = services.sync().status(system)?;
    Formatter::new(format).print_list(&states, "No sync runs recorded.", "systems")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::helpers::test_support::context_in;
    use tempfile::tempdir;
    use worksync_core::model::SyncCommand;
    use worksync_core::sync::CancellationToken;

    #[test]
    fn test_status_after_empty_sync() {
        let dir = tempdir().unwrap();
        let ctx = context_in(dir.path());
        ctx.init().unwrap();

        run_status(&ctx, None, OutputFormat::Text).unwrap();

        let services = ctx.services().unwrap();
        services
            .sync()
            .run(&SyncCommand::new("ado-main", Vec::new()), &CancellationToken::new())
            .unwrap();

        run_status(&ctx, Some("ado-main"), OutputFormat::Json).unwrap();
        let states = services.sync().status(Some("ado-main")).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].requested, 0);
        assert!(services.sync().status(Some("other")).unwrap().is_empty());
    }
}
