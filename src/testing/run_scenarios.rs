//! End-to-end scenarios for the control loop, driven entirely through the
//! collaborator fakes and the manual clock.

#[cfg(test)]
mod tests {
    use crate::config::SnapshotManagerConfig;
    use crate::error::{AuditError, ControlPlaneError, NotifyError};
    use crate::manager::SnapshotManager;
    use crate::snapshot::MAX_POLL_ATTEMPTS;
    use crate::testing::{FakeAuditStore, FakeControlPlane, FakeNotificationSink, ManualClock};
    use crate::types::{
        ApplicationDescriptor, ApplicationStatus, RunReport, SnapshotRecord, SnapshotStatus,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    const APP: &str = "orders-enrichment";
    const VERSION: u64 = 3;
    const START_MILLIS: u64 = 1_700_000_000_000;
    /// Snapshot name the run under test will mint.
    const RUN_SNAPSHOT: &str = "custom_1700000000000";

    struct Harness {
        control_plane: Arc<FakeControlPlane>,
        store: Arc<FakeAuditStore>,
        sink: Arc<FakeNotificationSink>,
        clock: Arc<ManualClock>,
        manager: SnapshotManager,
    }

    fn harness(retain_count: usize) -> Harness {
        let control_plane = Arc::new(FakeControlPlane::running(APP, VERSION));
        let store = Arc::new(FakeAuditStore::default());
        let sink = Arc::new(FakeNotificationSink::default());
        let clock = Arc::new(ManualClock::new(START_MILLIS));
        let config = SnapshotManagerConfig::new(APP)
            .with_retain_count(retain_count)
            .with_poll_interval(Duration::from_secs(30));
        let manager = SnapshotManager::new(
            config,
            control_plane.clone(),
            store.clone(),
            sink.clone(),
            clock.clone(),
        );
        Harness {
            control_plane,
            store,
            sink,
            clock,
            manager,
        }
    }

    fn record(name: &str, created_secs: i64, status: SnapshotStatus) -> SnapshotRecord {
        SnapshotRecord::new(
            name,
            VERSION,
            Utc.timestamp_opt(created_secs, 0).unwrap(),
            status,
        )
    }

    /// The run's own snapshot, already ready, newest in the directory.
    fn run_snapshot_ready() -> SnapshotRecord {
        record(RUN_SNAPSHOT, 10_000, SnapshotStatus::Ready)
    }

    #[tokio::test]
    async fn test_ready_on_first_poll() {
        let h = harness(30);
        h.control_plane.set_snapshots(vec![run_snapshot_ready()]);

        let result = h.manager.run().await;

        assert!(result.app_running);
        assert!(result.app_healthy);
        assert!(result.snapshot_initiated);
        assert!(result.snapshot_completed);
        assert!(!result.snapshot_delayed);
        assert!(!result.prune_needed);
        assert_eq!(result.run_id, START_MILLIS);
        assert_eq!(result.new_snapshot_name, RUN_SNAPSHOT);

        // One poll listing plus the post-completion retention listing.
        assert_eq!(h.control_plane.list_calls(), 2);
        assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(30)]);

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("New snapshot creation details"));

        let records = h.store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].new_snapshot_name, RUN_SNAPSHOT);
        assert_eq!(records[0].snapshots_deleted, None);
    }

    #[tokio::test]
    async fn test_delayed_when_never_ready() {
        let h = harness(30);
        h.control_plane
            .set_snapshots(vec![record(RUN_SNAPSHOT, 10_000, SnapshotStatus::InProgress)]);

        let result = h.manager.run().await;

        assert!(result.snapshot_initiated);
        assert!(!result.snapshot_completed);
        assert!(result.snapshot_delayed);
        assert!(result.app_healthy);

        // All four attempts consumed, no retention listing afterwards.
        assert_eq!(h.control_plane.list_calls(), MAX_POLL_ATTEMPTS);
        assert_eq!(h.clock.sleeps().len(), MAX_POLL_ATTEMPTS as usize);

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("did not complete on time or failed"));

        // No audit record without a completed snapshot.
        assert!(h.store.records().is_empty());
    }

    #[tokio::test]
    async fn test_not_running_skips_initiation() {
        let h = harness(30);
        h.control_plane.set_descriptor(ApplicationDescriptor {
            status: ApplicationStatus::NotRunning,
            version_id: VERSION,
        });

        let result = h.manager.run().await;

        assert!(!result.app_running);
        assert!(result.app_healthy);
        assert!(!result.snapshot_initiated);
        assert!(!result.snapshot_completed);

        assert!(h.control_plane.create_calls().is_empty());
        assert_eq!(h.control_plane.list_calls(), 0);
        assert!(h.store.records().is_empty());

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("is not running"));
    }

    #[tokio::test]
    async fn test_retention_pruning_with_partial_failures() {
        let h = harness(30);
        // 34 historical snapshots plus the new one: 35 in the directory.
        let mut snapshots: Vec<SnapshotRecord> = (0..34)
            .map(|i| record(&format!("custom_old_{i}"), i as i64, SnapshotStatus::Ready))
            .collect();
        snapshots.push(run_snapshot_ready());
        h.control_plane.set_snapshots(snapshots);
        h.control_plane.fail_delete_of("custom_old_1");
        h.control_plane.fail_delete_of("custom_old_3");

        let result = h.manager.run().await;

        assert!(result.snapshot_completed);
        assert!(result.prune_needed);
        assert_eq!(result.deleted_snapshots.len(), 3);
        assert_eq!(result.failed_deletions.len(), 2);

        // The excess set is exactly the five oldest, partitioned between
        // the two lists with no overlap.
        let deleted: HashSet<String> = result
            .deleted_snapshots
            .iter()
            .map(|s| s.name.clone())
            .collect();
        let failed: HashSet<String> = result
            .failed_deletions
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert!(deleted.is_disjoint(&failed));
        let union: HashSet<String> = deleted.union(&failed).cloned().collect();
        let oldest: HashSet<String> = (0..5).map(|i| format!("custom_old_{i}")).collect();
        assert_eq!(union, oldest);

        let report = result.report();
        assert_eq!(report.num_of_snapshot_deleted, 3);
        assert_eq!(report.num_of_snapshot_not_deleted, 2);

        let records = h.store.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].snapshots_deleted.is_some());
        assert!(records[0].snapshots_failed_to_be_deleted.is_some());
    }

    #[tokio::test]
    async fn test_probe_failure_marks_unhealthy_and_not_running() {
        let h = harness(30);
        h.control_plane
            .fail_describe(ControlPlaneError::Transient("throttled".into()));

        let result = h.manager.run().await;

        assert!(!result.app_running);
        assert!(!result.app_healthy);
        assert!(!result.snapshot_initiated);
        assert!(h.control_plane.create_calls().is_empty());

        // Both the not-running and the unhealthy notices fire.
        let messages = h.sink.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("is not running"));
        assert!(messages[1].contains("may not be healthy"));
    }

    #[tokio::test]
    async fn test_initiation_refusal_is_a_health_signal() {
        let h = harness(30);
        h.control_plane.fail_create(ControlPlaneError::InvalidRequest(
            "a snapshot operation is already in progress".into(),
        ));

        let result = h.manager.run().await;

        assert!(result.app_running);
        assert!(!result.app_healthy);
        assert!(!result.snapshot_initiated);
        assert!(!result.snapshot_delayed);

        // No polling without an acknowledged initiation.
        assert_eq!(h.control_plane.list_calls(), 0);
        assert!(h.store.records().is_empty());

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("may not be healthy"));
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_the_run() {
        let h = harness(30);
        h.control_plane.set_snapshots(vec![run_snapshot_ready()]);
        h.store.fail_put(AuditError::Rejected("capacity exceeded".into()));

        let result = h.manager.run().await;

        assert!(result.snapshot_completed);
        assert!(h.store.records().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_the_run() {
        let h = harness(30);
        h.control_plane.set_descriptor(ApplicationDescriptor {
            status: ApplicationStatus::NotRunning,
            version_id: VERSION,
        });
        h.sink
            .fail_publish(NotifyError::ChannelNotFound("alerts".into()));

        let result = h.manager.run().await;

        assert!(!result.app_running);
        assert!(h.sink.published().is_empty());
    }

    #[tokio::test]
    async fn test_handler_contract() {
        let h = harness(30);
        h.control_plane.set_snapshots(vec![run_snapshot_ready()]);

        let response = h
            .manager
            .handle(&json!({ "source": "scheduled-trigger" }))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        let report: RunReport = serde_json::from_str(&response.body).unwrap();
        assert_eq!(report.app_name, APP);
        assert_eq!(report.app_version, VERSION);
        assert!(report.new_snapshot_completed);
        assert_eq!(report.num_of_snapshot_deleted, 0);
    }

    #[tokio::test]
    async fn test_visible_on_second_attempt_then_ready_on_third() {
        let h = harness(30);
        let external = record("external_snapshot", 20_000, SnapshotStatus::Ready);
        let in_progress = record(RUN_SNAPSHOT, 30_000, SnapshotStatus::InProgress);
        let ready = record(RUN_SNAPSHOT, 30_000, SnapshotStatus::Ready);

        // Attempt 1: a foreign snapshot is still the newest entry.
        h.control_plane
            .queue_list_response(Ok(crate::control_plane::SnapshotPage::last(vec![
                external.clone(),
            ])));
        // Attempt 2: ours is visible but still in progress.
        h.control_plane
            .queue_list_response(Ok(crate::control_plane::SnapshotPage::last(vec![
                external.clone(),
                in_progress,
            ])));
        // Attempt 3: ready.
        h.control_plane.set_snapshots(vec![external, ready]);

        let result = h.manager.run().await;

        assert!(result.snapshot_completed);
        assert!(!result.snapshot_delayed);
        // Three poll listings plus the retention listing.
        assert_eq!(h.control_plane.list_calls(), 4);
        assert_eq!(h.clock.sleeps().len(), 3);
    }
}
