//! Partitioning of an incoming batch by project, and lookup of existing
//! local iterations by external id.

use std::collections::{BTreeMap, HashMap};

use crate::model::{ExternalIteration, Iteration};

/// External records belonging to one project, in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup<'a> {
    pub project_id: &'a str,
    pub records: Vec<&'a ExternalIteration>,
}

impl ProjectGroup<'_> {
    /// External ids present in this group.
    pub fn external_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.external_id.as_str())
    }
}

/// Partition `records` by project id.
///
/// Groups come out in byte-wise order of project id. Within a group the
/// batch order is kept. Reconciliation results do not depend on the group
/// order; the fixed order only keeps logs reproducible.
#[must_use]
pub fn group_by_project(records: &[ExternalIteration]) -> Vec<ProjectGroup<'_>> {
    let mut groups: BTreeMap<&str, Vec<&ExternalIteration>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.project_id.as_str())
            .or_default()
            .push(record);
    }
    groups
        .into_iter()
        .map(|(project_id, records)| ProjectGroup {
            project_id,
            records,
        })
        .collect()
}

/// Existing iterations keyed by external id (exact, ordinal match).
///
/// Iterations without an external id are not indexed.
#[derive(Debug, Default)]
pub struct ExistingIndex {
    by_external_id: HashMap<String, Iteration>,
}

impl ExistingIndex {
    #[must_use]
    pub fn build(existing: Vec<Iteration>) -> Self {
        let by_external_id = existing
            .into_iter()
            .filter(|it| it.ownership.is_external())
            .map(|it| (it.ownership.external_id.clone(), it))
            .collect();
        Self { by_external_id }
    }

    /// Take the iteration for `external_id` out of the index.
    pub fn take(&mut self, external_id: &str) -> Option<Iteration> {
        self.by_external_id.remove(external_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_external_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_external_id.is_empty()
    }
}
