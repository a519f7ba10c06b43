//! Implementation of `worksync sync`.

use anyhow::Result;
use serde::Serialize;
use std::process::ExitCode;

use crate::cli::commands::helpers::open_services;
use crate::output::{Formatter, OutputFormat};
use worksync_core::core::sync::{SyncReport, SyncStatus};
use worksync_core::core::CoreContext;
use worksync_core::sync::CancellationToken;

/// Exit status for an interrupted run.
const EXIT_CANCELLED: u8 = 130;

/// Serializable output for the sync command.
#[derive(Serialize)]
struct SyncOutput<'a> {
    system_id: &'a str,
    status: SyncStatus,
    requested: usize,
    created: usize,
    updated: usize,
    unchanged: usize,
    deleted: usize,
    processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_external_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> SyncOutput<'a> {
    fn from_report(report: &'a SyncReport) -> Self {
        let outcome = &report.outcome;
        Self {
            system_id: &report.system_id,
            status: report.status,
            requested: outcome.requested,
            created: outcome.created,
            updated: outcome.updated,
            unchanged: outcome.unchanged,
            deleted: outcome.deleted,
            processed: outcome.processed(),
            last_external_id: outcome.last_external_id.as_deref(),
            error: report.error.as_deref(),
        }
    }
}

/// Run the sync command on an already read JSON command. A failed or
/// cancelled run prints its report and exits non-zero.
#[tracing::instrument(skip_all)]
pub fn run_sync(
    ctx: &CoreContext,
    json: &str,
    cancel: &CancellationToken,
    format: OutputFormat,
) -> Result<ExitCode> {
    let services = open_services(ctx)?;
    let report = services.sync().run_json(json, cancel)?;

    Formatter::new(format).print(&SyncOutput::from_report(&report))?;
    Ok(exit_code(report.status))
}

fn exit_code(status: SyncStatus) -> ExitCode {
    match status {
        SyncStatus::Succeeded => ExitCode::SUCCESS,
        SyncStatus::Failed => ExitCode::FAILURE,
        SyncStatus::Cancelled => ExitCode::from(EXIT_CANCELLED),
    }
}
