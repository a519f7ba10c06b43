//! Per-invocation sync counters.

use std::fmt;

use serde::Serialize;

/// Counters accumulated while reconciling a batch.
///
/// Each external record is counted once as requested and then resolves to
/// exactly one of created, updated, or unchanged. `last_external_id` holds
/// the record currently being resolved, so a failure mid-batch names the
/// record that caused it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub requested: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_external_id: Option<String>,
}

impl SyncOutcome {
    pub fn record_requested(&mut self, external_id: &str) {
        self.requested += 1;
        self.last_external_id = Some(external_id.to_string());
    }

    pub fn record_created(&mut self) {
        self.created += 1;
        self.last_external_id = None;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
        self.last_external_id = None;
    }

    pub fn record_unchanged(&mut self) {
        self.unchanged += 1;
        self.last_external_id = None;
    }

    pub fn record_deleted(&mut self, count: usize) {
        self.deleted += count;
    }

    /// Records that were written: created plus updated.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.created + self.updated
    }

    /// Fold a committed group's counters into this one.
    pub fn merge(&mut self, group: &Self) {
        self.requested += group.requested;
        self.created += group.created;
        self.updated += group.updated;
        self.unchanged += group.unchanged;
        self.deleted += group.deleted;
        if group.last_external_id.is_some() {
            self.last_external_id.clone_from(&group.last_external_id);
        }
    }

    /// Fold a group whose upserts were rolled back.
    ///
    /// Only what actually happened survives: the requests seen, deletions
    /// (committed separately), and the record that was being resolved.
    pub fn merge_failed(&mut self, group: &Self) {
        self.requested += group.requested;
        self.deleted += group.deleted;
        self.last_external_id.clone_from(&group.last_external_id);
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requested={} created={} updated={} unchanged={} deleted={} processed={}",
            self.requested,
            self.created,
            self.updated,
            self.unchanged,
            self.deleted,
            self.processed()
        )?;
        if let Some(id) = &self.last_external_id {
            write!(f, " last_external_id={id}")?;
        }
        Ok(())
    }
}
