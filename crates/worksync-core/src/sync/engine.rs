//! Sync orchestrator: runs reconciliation group by group against a store.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, warn};

use super::grouping::{group_by_project, ProjectGroup};
use super::reconcile::{find_orphans, plan_upserts, ReconcileContext};
use super::{CancellationToken, IterationStore, SyncError, SyncFailure, SyncOutcome};
use crate::model::{Connector, SyncCommand, TeamDirectory, TeamMapping};
use crate::outbox::{DeletionNotice, EventPublisher};

/// Reconciles external iterations into an [`IterationStore`].
///
/// Each project group is committed on its own. A failing group stops the run
/// but leaves earlier groups committed. Concurrent runs against the same
/// system must be serialized by the caller.
pub struct IterationSyncer<'a, S: ?Sized, P: ?Sized> {
    store: &'a S,
    publisher: &'a P,
    connector: Connector,
}

impl<'a, S, P> IterationSyncer<'a, S, P>
where
    S: IterationStore + ?Sized,
    P: EventPublisher + ?Sized,
{
    pub fn new(store: &'a S, publisher: &'a P) -> Self {
        Self {
            store,
            publisher,
            connector: Connector::default(),
        }
    }

    /// Reconcile `command` into the store.
    ///
    /// An empty batch succeeds without touching the store. Panics raised
    /// inside the pipeline are caught here and reported as
    /// [`SyncError::Unexpected`].
    pub fn sync(
        &self,
        command: &SyncCommand,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncFailure> {
        let mut outcome = SyncOutcome::default();
        if command.records.is_empty() {
            info!(system_id = %command.system_id, "No external iterations to sync");
            return Ok(outcome);
        }

        let groups = group_by_project(&command.records);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.sync_groups(
                &command.system_id,
                &groups,
                &command.team_mappings,
                cancel,
                &mut outcome,
            )
        }))
        .unwrap_or_else(|payload| Err(SyncError::Unexpected(panic_message(payload.as_ref()))));

        match result {
            Ok(()) => {
                info!(
                    system_id = %command.system_id,
                    groups = groups.len(),
                    requested = outcome.requested,
                    created = outcome.created,
                    updated = outcome.updated,
                    unchanged = outcome.unchanged,
                    deleted = outcome.deleted,
                    processed = outcome.processed(),
                    "Synced iterations"
                );
                Ok(outcome)
            }
            Err(error) => {
                error!(
                    system_id = %command.system_id,
                    requested = outcome.requested,
                    created = outcome.created,
                    updated = outcome.updated,
                    deleted = outcome.deleted,
                    last_external_id = outcome.last_external_id.as_deref(),
                    error = %error,
                    "Iteration sync failed"
                );
                Err(SyncFailure { error, outcome })
            }
        }
    }

    /// Reconcile `groups` in the order given.
    pub(crate) fn sync_groups(
        &self,
        system_id: &str,
        groups: &[ProjectGroup<'_>],
        team_mappings: &TeamMapping,
        cancel: &CancellationToken,
        outcome: &mut SyncOutcome,
    ) -> Result<(), SyncError> {
        let teams = TeamDirectory::from(self.store.load_teams().map_err(|source| {
            SyncError::Load {
                scope: "teams".to_string(),
                source,
            }
        })?);
        let ctx = ReconcileContext {
            connector: self.connector,
            system_id,
            teams: &teams,
            team_mappings,
        };

        for group in groups {
            cancel.check()?;

            let mut group_outcome = SyncOutcome::default();
            match self.sync_group(&ctx, group, cancel, &mut group_outcome) {
                Ok(()) => {
                    info!(
                        system_id,
                        project_id = group.project_id,
                        requested = group_outcome.requested,
                        created = group_outcome.created,
                        updated = group_outcome.updated,
                        unchanged = group_outcome.unchanged,
                        deleted = group_outcome.deleted,
                        last_external_id = group_outcome.last_external_id.as_deref(),
                        "Synced project iterations"
                    );
                    outcome.merge(&group_outcome);
                }
                Err(error) => {
                    warn!(
                        system_id,
                        project_id = group.project_id,
                        requested = group_outcome.requested,
                        deleted = group_outcome.deleted,
                        last_external_id = group_outcome.last_external_id.as_deref(),
                        error = %error,
                        "Project iteration sync failed"
                    );
                    outcome.merge_failed(&group_outcome);
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    fn sync_group(
        &self,
        ctx: &ReconcileContext<'_>,
        group: &ProjectGroup<'_>,
        cancel: &CancellationToken,
        outcome: &mut SyncOutcome,
    ) -> Result<(), SyncError> {
        let existing = self
            .store
            .load_project_iterations(ctx.connector, ctx.system_id, group.project_id)
            .map_err(|source| SyncError::Load {
                scope: format!("iterations for project {}", group.project_id),
                source,
            })?;

        let orphans = find_orphans(group, &existing);
        self.delete_orphans(group.project_id, &orphans, outcome);

        cancel.check()?;

        let changes = plan_upserts(ctx, group, existing, outcome)?;
        self.store
            .save_changes(&changes)
            .map_err(|source| SyncError::Persist {
                project_id: group.project_id.to_string(),
                source,
            })
    }

    /// Delete orphans and publish a notice per deleted iteration.
    ///
    /// Failures are logged and swallowed; undeleted orphans are retried on
    /// the next sync.
    fn delete_orphans(&self, project_id: &str, orphans: &[String], outcome: &mut SyncOutcome) {
        if orphans.is_empty() {
            return;
        }

        match self.store.delete_iterations(orphans) {
            Ok(deleted) => {
                outcome.record_deleted(deleted);
                for iteration_id in orphans {
                    let notice = DeletionNotice::new(iteration_id.as_str());
                    if let Err(err) = self.publisher.publish(&notice) {
                        warn!(
                            project_id,
                            iteration_id = %iteration_id,
                            error = %format!("{err:#}"),
                            "Failed to publish iteration deletion"
                        );
                    }
                }
            }
            Err(err) => {
                warn!(
                    project_id,
                    orphans = orphans.len(),
                    error = %format!("{err:#}"),
                    "Failed to delete orphaned iterations"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with non-string payload".to_string())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;

    use anyhow::{anyhow, Result};
    use proptest::prelude::*;

    use super::*;
    use crate::model::{
        ExternalIteration, Iteration, IterationKind, MetadataKey, Team, TeamKind, ValidationError,
    };
    use crate::store::SyncDb;
    use crate::sync::test_support::{existing, record, SYSTEM};
    use crate::sync::ChangeSet;

    /// Collects published notices in memory.
    #[derive(Default)]
    struct MemoryPublisher {
        notices: RefCell<Vec<DeletionNotice>>,
        fail: bool,
    }

    impl EventPublisher for MemoryPublisher {
        fn publish(&self, notice: &DeletionNotice) -> Result<()> {
            if self.fail {
                return Err(anyhow!("broker unavailable"));
            }
            self.notices.borrow_mut().push(notice.clone());
            Ok(())
        }
    }

    /// Wraps a real store and injects failures or panics.
    struct FaultyStore {
        inner: SyncDb,
        calls: Cell<usize>,
        fail_delete: bool,
        fail_save_for: Option<&'static str>,
        panic_on_load: bool,
        cancel_on_delete: Option<CancellationToken>,
    }

    impl FaultyStore {
        fn new(inner: SyncDb) -> Self {
            Self {
                inner,
                calls: Cell::new(0),
                fail_delete: false,
                fail_save_for: None,
                panic_on_load: false,
                cancel_on_delete: None,
            }
        }
    }

    impl IterationStore for FaultyStore {
        fn load_teams(&self) -> Result<Vec<Team>> {
            self.calls.set(self.calls.get() + 1);
            assert!(!self.panic_on_load, "team table is corrupt");
            self.inner.load_teams()
        }

        fn load_project_iterations(
            &self,
            connector: Connector,
            system_id: &str,
            project_id: &str,
        ) -> Result<Vec<Iteration>> {
            self.calls.set(self.calls.get() + 1);
            self.inner
                .load_project_iterations(connector, system_id, project_id)
        }

        fn delete_iterations(&self, iteration_ids: &[String]) -> Result<usize> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_delete {
                return Err(anyhow!("FOREIGN KEY constraint failed"));
            }
            let deleted = self.inner.delete_iterations(iteration_ids)?;
            if let Some(cancel) = &self.cancel_on_delete {
                cancel.cancel();
            }
            Ok(deleted)
        }

        fn save_changes(&self, changes: &ChangeSet) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            let project = changes
                .inserted
                .iter()
                .chain(&changes.updated)
                .find_map(Iteration::project_id);
            if self.fail_save_for.is_some() && project == self.fail_save_for {
                return Err(anyhow!("disk I/O error"));
            }
            self.inner.save_changes(changes)
        }
    }

    fn seed(db: &SyncDb, iterations: Vec<Iteration>) {
        db.save_changes(&ChangeSet {
            inserted: iterations,
            updated: Vec::new(),
        })
        .unwrap();
    }

    fn scenario_db() -> (SyncDb, String) {
        let db = SyncDb::open_in_memory().unwrap();
        let gone = existing(SYSTEM, "P1", "100", "Sprint 0");
        let gone_id = gone.id.clone();
        seed(&db, vec![gone, existing(SYSTEM, "P1", "101", "Stale name")]);
        (db, gone_id)
    }

    fn scenario_records() -> Vec<ExternalIteration> {
        vec![
            record("P1", "101", "Sprint 1"),
            record("P1", "102", "Sprint 2"),
            record("P2", "201", "Sprint 1"),
        ]
    }

    /// Comparable store contents, ignoring minted local ids.
    fn snapshot(db: &SyncDb) -> BTreeSet<String> {
        db.list_iterations(None)
            .unwrap()
            .iter()
            .map(|it| {
                format!(
                    "{}|{}|{}|{}|{}|{:?}|{:?}|{:?}",
                    it.project_id().unwrap_or_default(),
                    it.external_id(),
                    it.name,
                    it.kind,
                    it.state,
                    it.date_range,
                    it.team_id,
                    it.metadata
                )
            })
            .collect()
    }

    #[test]
    fn test_scenario_two_projects() {
        let (db, gone_id) = scenario_db();
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(SYSTEM, scenario_records());

        let outcome = IterationSyncer::new(&db, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.processed(), 3);
        assert!(outcome.last_external_id.is_none());

        assert!(db.get_iteration(&gone_id).unwrap().is_none());
        let p1 = db.list_iterations(Some("P1")).unwrap();
        let p1_names: Vec<(&str, &str)> =
            p1.iter().map(|it| (it.external_id(), it.name.as_str())).collect();
        assert_eq!(p1_names, vec![("101", "Sprint 1"), ("102", "Sprint 2")]);
        assert_eq!(db.list_iterations(Some("P2")).unwrap().len(), 1);

        let notices = publisher.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].iteration_id, gone_id);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let (db, _) = scenario_db();
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(SYSTEM, scenario_records());
        let syncer = IterationSyncer::new(&db, &publisher);

        syncer.sync(&command, &CancellationToken::new()).unwrap();
        let after_first = snapshot(&db);

        let second = syncer.sync(&command, &CancellationToken::new()).unwrap();
        assert_eq!(second.requested, 3);
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.unchanged, 3);
        assert_eq!(snapshot(&db), after_first);
    }

    #[test]
    fn test_empty_batch_touches_nothing() {
        let store = FaultyStore::new(SyncDb::open_in_memory().unwrap());
        let publisher = MemoryPublisher::default();

        let outcome = IterationSyncer::new(&store, &publisher)
            .sync(&SyncCommand::new(SYSTEM, Vec::new()), &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome, SyncOutcome::default());
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_orphans_only_removed_within_their_project() {
        let db = SyncDb::open_in_memory().unwrap();
        seed(
            &db,
            vec![
                existing(SYSTEM, "P1", "100", "Orphan"),
                existing(SYSTEM, "P3", "300", "Other project"),
                existing("other-system", "P1", "100", "Other system"),
            ],
        );
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(SYSTEM, vec![record("P1", "101", "New")]);

        let outcome = IterationSyncer::new(&db, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.deleted, 1);
        let remaining: BTreeSet<String> = db
            .list_iterations(None)
            .unwrap()
            .into_iter()
            .map(|it| it.name)
            .collect();
        let expected: BTreeSet<String> = ["New", "Other project", "Other system"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn test_delete_failure_is_not_fatal() {
        let (db, gone_id) = scenario_db();
        let mut store = FaultyStore::new(db);
        store.fail_delete = true;
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(SYSTEM, scenario_records());

        let outcome = IterationSyncer::new(&store, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.updated, 1);
        assert!(store.inner.get_iteration(&gone_id).unwrap().is_some());
        assert!(publisher.notices.borrow().is_empty());
    }

    #[test]
    fn test_publish_failure_is_not_fatal() {
        let (db, gone_id) = scenario_db();
        let publisher = MemoryPublisher {
            fail: true,
            ..MemoryPublisher::default()
        };
        let command = SyncCommand::new(SYSTEM, scenario_records());

        let outcome = IterationSyncer::new(&db, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.deleted, 1);
        assert!(db.get_iteration(&gone_id).unwrap().is_none());
    }

    #[test]
    fn test_validation_failure_keeps_earlier_groups() {
        let db = SyncDb::open_in_memory().unwrap();
        let publisher = MemoryPublisher::default();
        let mut records = vec![
            record("A", "1", "Sprint A1"),
            record("B", "2", "Sprint B1"),
            record("B", "3", "Sprint B2"),
            record("C", "4", "Sprint C1"),
        ];
        records[2].name = String::new();
        let command = SyncCommand::new(SYSTEM, records);

        let failure = IterationSyncer::new(&db, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(failure.error, SyncError::Validation { ref project_id, .. } if project_id == "B"));
        assert_eq!(failure.outcome.created, 1, "only group A was committed");
        assert_eq!(failure.outcome.requested, 3);
        assert_eq!(failure.outcome.last_external_id.as_deref(), Some("3"));

        assert_eq!(db.list_iterations(Some("A")).unwrap().len(), 1);
        assert!(db.list_iterations(Some("B")).unwrap().is_empty());
        assert!(db.list_iterations(Some("C")).unwrap().is_empty(), "processing stops at B");
    }

    #[test]
    fn test_persist_failure_keeps_earlier_groups() {
        let mut store = FaultyStore::new(SyncDb::open_in_memory().unwrap());
        store.fail_save_for = Some("B");
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(
            SYSTEM,
            vec![record("A", "1", "Sprint A1"), record("B", "2", "Sprint B1")],
        );

        let failure = IterationSyncer::new(&store, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(failure.error, SyncError::Persist { ref project_id, .. } if project_id == "B"));
        assert_eq!(failure.outcome.created, 1);
        assert_eq!(store.inner.list_iterations(Some("A")).unwrap().len(), 1);
        assert!(store.inner.list_iterations(Some("B")).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let db = SyncDb::open_in_memory().unwrap();
        let publisher = MemoryPublisher::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = IterationSyncer::new(&db, &publisher)
            .sync(&SyncCommand::new(SYSTEM, scenario_records()), &cancel)
            .unwrap_err();

        assert!(matches!(failure.error, SyncError::Cancelled));
        assert_eq!(failure.outcome, SyncOutcome::default());
        assert!(db.list_iterations(None).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_after_delete_skips_upserts() {
        let (db, gone_id) = scenario_db();
        let cancel = CancellationToken::new();
        let mut store = FaultyStore::new(db);
        store.cancel_on_delete = Some(cancel.clone());
        let publisher = MemoryPublisher::default();
        let command = SyncCommand::new(SYSTEM, scenario_records());

        let failure = IterationSyncer::new(&store, &publisher)
            .sync(&command, &cancel)
            .unwrap_err();

        assert!(matches!(failure.error, SyncError::Cancelled));
        assert_eq!(failure.outcome.deleted, 1);
        assert_eq!(failure.outcome.created, 0);
        assert_eq!(failure.outcome.updated, 0);
        assert_eq!(publisher.notices.borrow().len(), 1);

        assert!(store.inner.get_iteration(&gone_id).unwrap().is_none());
        let names: Vec<String> = store
            .inner
            .list_iterations(None)
            .unwrap()
            .into_iter()
            .map(|it| it.name)
            .collect();
        assert_eq!(names, vec!["Stale name".to_string()]);
    }

    #[test]
    fn test_blank_external_id_is_rejected_on_every_run() {
        let db = SyncDb::open_in_memory().unwrap();
        let publisher = MemoryPublisher::default();
        let syncer = IterationSyncer::new(&db, &publisher);
        let command = SyncCommand::new(SYSTEM, vec![record("P1", "", "Sprint 1")]);

        for _ in 0..3 {
            let failure = syncer
                .sync(&command, &CancellationToken::new())
                .unwrap_err();
            assert!(matches!(
                failure.error,
                SyncError::Validation { source: ValidationError::BlankExternalId, .. }
            ));
            assert_eq!(failure.outcome.created, 0);
        }
        assert!(db.list_iterations(Some("P1")).unwrap().is_empty());
    }

    #[test]
    fn test_panic_is_converted_to_failure() {
        let mut store = FaultyStore::new(SyncDb::open_in_memory().unwrap());
        store.panic_on_load = true;
        let publisher = MemoryPublisher::default();

        let failure = IterationSyncer::new(&store, &publisher)
            .sync(&SyncCommand::new(SYSTEM, scenario_records()), &CancellationToken::new())
            .unwrap_err();

        match failure.error {
            SyncError::Unexpected(message) => assert!(message.contains("team table is corrupt")),
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn test_sprint_downgrade_through_store() {
        let db = SyncDb::open_in_memory().unwrap();
        for (id, kind) in [("t-scrum", TeamKind::Scrum), ("t-kanban", TeamKind::Kanban)] {
            db.upsert_team(&Team {
                id: id.to_string(),
                name: id.to_string(),
                kind,
            })
            .unwrap();
        }
        let mut scrum = record("P1", "1", "Scrum sprint");
        scrum.type_classification = IterationKind::Sprint;
        scrum.team_id = Some("ext-scrum".to_string());
        let mut kanban = record("P1", "2", "Kanban sprint");
        kanban.type_classification = IterationKind::Sprint;
        kanban.team_id = Some("ext-kanban".to_string());

        let mappings = [
            ("ext-scrum", Some("t-scrum".to_string())),
            ("ext-kanban", Some("t-kanban".to_string())),
        ]
        .into_iter()
        .collect();
        let command = SyncCommand::new(SYSTEM, vec![scrum, kanban]).with_team_mappings(mappings);
        let publisher = MemoryPublisher::default();
        IterationSyncer::new(&db, &publisher)
            .sync(&command, &CancellationToken::new())
            .unwrap();

        let kinds: Vec<(String, IterationKind)> = db
            .list_iterations(Some("P1"))
            .unwrap()
            .into_iter()
            .map(|it| (it.external_id().to_string(), it.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("1".to_string(), IterationKind::Sprint),
                ("2".to_string(), IterationKind::Iteration),
            ]
        );
    }

    #[test]
    fn test_identity_metadata_survives_resync() {
        let db = SyncDb::open_in_memory().unwrap();
        let publisher = MemoryPublisher::default();
        let syncer = IterationSyncer::new(&db, &publisher);

        let first = record("P1", "101", "Sprint 1");
        syncer
            .sync(&SyncCommand::new(SYSTEM, vec![first.clone()]), &CancellationToken::new())
            .unwrap();

        let mut second = first;
        second.metadata.identifier = "changed".to_string();
        second.metadata.path = r"P1\Release 2\Sprint 1".to_string();
        let outcome = syncer
            .sync(&SyncCommand::new(SYSTEM, vec![second]), &CancellationToken::new())
            .unwrap();
        assert_eq!(outcome.updated, 1);

        let stored = db.list_iterations(Some("P1")).unwrap().remove(0);
        assert_eq!(stored.metadata.get(MetadataKey::Identifier), Some("101"));
        assert_eq!(stored.metadata.get(MetadataKey::Path), Some(r"P1\Release 2\Sprint 1"));
    }

    fn arb_batch() -> impl Strategy<Value = (Vec<ExternalIteration>, Vec<(String, String)>)> {
        let projects = prop::sample::select(vec!["P1", "P2", "P3", "P4"]);
        let records = prop::collection::btree_map(
            (projects.clone(), 0u8..6),
            "[A-Za-z][A-Za-z ]{0,8}",
            1..12,
        );
        let seeded = prop::collection::btree_set((projects, 0u8..8), 0..8);
        (records, seeded).prop_map(|(records, seeded)| {
            let batch = records
                .into_iter()
                .map(|((project, id), name)| record(project, &id.to_string(), &name))
                .collect();
            let seeded = seeded
                .into_iter()
                .map(|(project, id)| (project.to_string(), id.to_string()))
                .collect();
            (batch, seeded)
        })
    }

    /// A batch, its seeded rows, and a permutation of the batch's project ids.
    fn arb_batch_with_order(
    ) -> impl Strategy<Value = (Vec<ExternalIteration>, Vec<(String, String)>, Vec<String>)> {
        arb_batch().prop_flat_map(|(batch, seeded)| {
            let projects: Vec<String> = group_by_project(&batch)
                .iter()
                .map(|g| g.project_id.to_string())
                .collect();
            (Just(batch), Just(seeded), Just(projects).prop_shuffle())
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_group_order_does_not_change_final_state(
            (batch, seeded, order) in arb_batch_with_order(),
        ) {
            let run = |order: Option<&[String]>| {
                let db = SyncDb::open_in_memory().unwrap();
                seed_db(&db, &seeded);
                let mut groups = group_by_project(&batch);
                if let Some(order) = order {
                    groups.sort_by_key(|g| order.iter().position(|p| p == g.project_id));
                }
                let publisher = MemoryPublisher::default();
                let mut outcome = SyncOutcome::default();
                IterationSyncer::new(&db, &publisher)
                    .sync_groups(SYSTEM, &groups, &TeamMapping::new(), &CancellationToken::new(), &mut outcome)
                    .unwrap();
                (snapshot(&db), outcome)
            };

            let (sorted_state, sorted_outcome) = run(None);
            let (shuffled_state, shuffled_outcome) = run(Some(&order));
            prop_assert_eq!(sorted_state, shuffled_state);
            prop_assert_eq!(sorted_outcome.created, shuffled_outcome.created);
            prop_assert_eq!(sorted_outcome.updated, shuffled_outcome.updated);
            prop_assert_eq!(sorted_outcome.deleted, shuffled_outcome.deleted);
        }
    }

    fn seed_db(db: &SyncDb, seeded: &[(String, String)]) {
        let iterations = seeded
            .iter()
            .map(|(project, id)| existing(SYSTEM, project, id, &format!("Seeded {id}")))
            .collect();
        seed(db, iterations);
    }
}
