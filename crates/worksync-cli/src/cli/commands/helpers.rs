//! Shared helpers for CLI commands.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use worksync_core::core::{CoreContext, WorksyncServices};

/// Open services. Before `worksync init` the error says to run it.
pub fn open_services(ctx: &CoreContext) -> Result<WorksyncServices> {
    Ok(ctx.services()?)
}

/// Read a sync command from a file, or from stdin when `input` is `-`.
pub fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read sync command from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read sync command: {}", input.display()))
}
