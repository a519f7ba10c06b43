//! Per-group reconciliation: orphan detection and upsert planning.
//!
//! Both steps are pure. The engine applies their results to the store.

use std::collections::HashSet;

use tracing::debug;

use super::grouping::{ExistingIndex, ProjectGroup};
use super::{SyncError, SyncOutcome};
use crate::model::{
    effective_kind, Connector, ExternalIteration, ExternalMetadata, Iteration, IterationFields,
    MetadataKey, OwnershipInfo, TeamDirectory, TeamMapping, ValidationError,
};

/// Pending writes for one project group.
///
/// Only iterations that actually changed are tracked; an empty change set
/// commits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub inserted: Vec<Iteration>,
    pub updated: Vec<Iteration>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty()
    }
}

/// Inputs shared by every group of one sync invocation.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileContext<'a> {
    pub connector: Connector,
    pub system_id: &'a str,
    pub teams: &'a TeamDirectory,
    pub team_mappings: &'a TeamMapping,
}

/// Local ids of existing iterations absent from the group's batch.
///
/// Iterations without an external id are never treated as orphans.
#[must_use]
pub fn find_orphans(group: &ProjectGroup<'_>, existing: &[Iteration]) -> Vec<String> {
    let keep: HashSet<&str> = group.external_ids().collect();
    existing
        .iter()
        .filter(|it| it.ownership.is_external() && !keep.contains(it.external_id()))
        .map(|it| it.id.clone())
        .collect()
}

/// Work out the creates and updates for one group, in batch order.
///
/// `outcome` is updated per record. The first validation failure aborts the
/// whole group; `outcome.last_external_id` then names the failing record.
pub fn plan_upserts(
    ctx: &ReconcileContext<'_>,
    group: &ProjectGroup<'_>,
    existing: Vec<Iteration>,
    outcome: &mut SyncOutcome,
) -> Result<ChangeSet, SyncError> {
    let mut index = ExistingIndex::build(existing);
    let mut changes = ChangeSet::default();

    for record in &group.records {
        outcome.record_requested(&record.external_id);
        let fields = resolve_fields(ctx, record);

        // A blank id never matches on later runs, so it would be recreated each time.
        let result = if record.external_id.trim().is_empty() {
            Err(ValidationError::BlankExternalId)
        } else {
            match index.take(&record.external_id) {
                Some(mut iteration) => {
                    apply_update(&mut iteration, fields, record).map(|changed| {
                        if changed {
                            debug!(external_id = %record.external_id, iteration_id = %iteration.id, "Updating iteration");
                            changes.updated.push(iteration);
                            outcome.record_updated();
                        } else {
                            outcome.record_unchanged();
                        }
                    })
                }
                None => create(ctx, fields, record).map(|iteration| {
                    debug!(external_id = %record.external_id, iteration_id = %iteration.id, "Creating iteration");
                    changes.inserted.push(iteration);
                    outcome.record_created();
                }),
            }
        };

        result.map_err(|source| SyncError::Validation {
            project_id: group.project_id.to_string(),
            external_id: record.external_id.clone(),
            source,
        })?;
    }

    Ok(changes)
}

/// Team resolution plus the sprint downgrade rule.
fn resolve_fields(ctx: &ReconcileContext<'_>, record: &ExternalIteration) -> IterationFields {
    let team = ctx
        .teams
        .resolve(ctx.team_mappings, record.team_id.as_deref());
    let kind = effective_kind(record.type_classification, team);
    if kind != record.type_classification {
        debug!(
            external_id = %record.external_id,
            team_id = ?team.map(|t| t.id.as_str()),
            "Downgrading sprint to iteration: team does not support sprints"
        );
    }

    IterationFields {
        name: record.name.clone(),
        kind,
        state: record.lifecycle_state,
        date_range: record.date_range,
        team_id: team.map(|t| t.id.clone()),
    }
}

fn apply_update(
    iteration: &mut Iteration,
    fields: IterationFields,
    record: &ExternalIteration,
) -> Result<bool, ValidationError> {
    let fields_changed = iteration.apply_update(fields)?;
    let metadata_changed = iteration
        .metadata
        .upsert_mutable(MetadataKey::Path, record.metadata.path.as_str())?;
    Ok(fields_changed || metadata_changed)
}

fn create(
    ctx: &ReconcileContext<'_>,
    fields: IterationFields,
    record: &ExternalIteration,
) -> Result<Iteration, ValidationError> {
    let ownership = OwnershipInfo::new(ctx.connector, ctx.system_id, record.external_id.as_str());
    let metadata = ExternalMetadata::for_new_iteration(
        record.metadata.identifier.as_str(),
        record.project_id.as_str(),
        record.metadata.path.as_str(),
    );
    Iteration::create(fields, ownership, metadata)
}
