//! Run orchestration: the control loop entry point.

use crate::audit::{AuditRecorder, AuditStore};
use crate::clock::Clock;
use crate::config::SnapshotManagerConfig;
use crate::control_plane::ControlPlane;
use crate::error::Result;
use crate::notify::{NotificationSink, Notifier};
use crate::probe::StatusProber;
use crate::snapshot::{
    CompletionPoller, RetentionPruner, SnapshotDirectory, SnapshotInitiator,
};
use crate::types::{Response, RunResult, SnapshotRecord};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Sequences one control-loop run per invocation: probe, initiate, poll,
/// prune, notify, audit. Each run is independent and stateless; concurrent
/// separate invocations against the same application are not coordinated.
#[derive(Debug)]
pub struct SnapshotManager {
    config: SnapshotManagerConfig,
    prober: StatusProber,
    initiator: SnapshotInitiator,
    directory: SnapshotDirectory,
    poller: CompletionPoller,
    pruner: RetentionPruner,
    notifier: Notifier,
    recorder: AuditRecorder,
    clock: Arc<dyn Clock>,
}

impl SnapshotManager {
    /// Wire the control loop to its collaborators.
    pub fn new(
        config: SnapshotManagerConfig,
        control_plane: Arc<dyn ControlPlane>,
        audit_store: Arc<dyn AuditStore>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let directory = SnapshotDirectory::new(control_plane.clone());
        let poller =
            CompletionPoller::new(directory.clone(), clock.clone(), config.poll_interval);
        Self {
            prober: StatusProber::new(control_plane.clone()),
            initiator: SnapshotInitiator::new(control_plane.clone()),
            pruner: RetentionPruner::new(control_plane),
            notifier: Notifier::new(sink),
            recorder: AuditRecorder::new(audit_store),
            directory,
            poller,
            clock,
            config,
        }
    }

    /// Host-facing invocation contract. The trigger payload is logged and
    /// otherwise unused; the answer is always 200 with the run result as
    /// body. Only response serialization can fail the invocation.
    pub async fn handle(&self, event: &Value) -> Result<Response> {
        info!(event = %event, "snapshot manager invoked");
        let result = self.run().await;
        Ok(Response {
            status_code: 200,
            body: serde_json::to_string(&result.report())?,
        })
    }

    /// Execute one control-loop run.
    pub async fn run(&self) -> RunResult {
        let run_id = self.clock.now_millis();
        let mut result = RunResult::new(run_id, &self.config.app_name);
        info!(run_id, app = %self.config.app_name, "snapshot manager run started");

        let probe = self.prober.probe(&self.config.app_name).await;
        result.app_version = probe.descriptor.version_id;
        if probe.probe_failed {
            result.app_healthy = false;
        }

        if probe.descriptor.status.is_running() {
            let initiation = self
                .initiator
                .initiate(&self.config.app_name, &result.new_snapshot_name)
                .await;
            if initiation.initiated {
                result.snapshot_initiated = true;
            } else {
                // Initiation refusal is a health signal, not just an
                // initiation signal.
                result.app_healthy = false;
            }
        } else {
            result.app_running = false;
            self.notifier
                .app_not_running(run_id, &self.config.app_name)
                .await;
        }

        if !result.app_healthy {
            self.notifier
                .app_unhealthy(run_id, &self.config.app_name)
                .await;
        }

        let mut new_snapshot: Option<SnapshotRecord> = None;
        if result.snapshot_initiated {
            let poll = self
                .poller
                .wait_for_ready(
                    &self.config.app_name,
                    probe.descriptor.version_id,
                    &result.new_snapshot_name,
                )
                .await;
            if poll.is_ready() {
                result.snapshot_completed = true;
                new_snapshot = poll.snapshot;
            } else {
                result.snapshot_delayed = true;
            }
        }

        match &new_snapshot {
            Some(snapshot) => {
                self.notifier
                    .run_succeeded(run_id, &self.config.app_name, snapshot)
                    .await;
            }
            None if result.snapshot_delayed => {
                self.notifier
                    .run_delayed(
                        run_id,
                        &self.config.app_name,
                        &result.new_snapshot_name,
                        self.clock.now(),
                    )
                    .await;
            }
            None => {}
        }

        if result.snapshot_completed {
            // Pruning works against a listing taken after completion, never
            // against the poll loop's stale view.
            let snapshots = self
                .directory
                .list_for_version(&self.config.app_name, probe.descriptor.version_id)
                .await;
            if snapshots.len() > self.config.retain_count {
                result.prune_needed = true;
                let outcome = self
                    .pruner
                    .prune(&self.config.app_name, &snapshots, self.config.retain_count)
                    .await;
                result.deleted_snapshots = outcome.deleted;
                result.failed_deletions = outcome.failed;
            } else {
                info!(
                    count = snapshots.len(),
                    retain = self.config.retain_count,
                    "snapshot count within retention, nothing to delete"
                );
            }

            if let Some(snapshot) = &new_snapshot {
                self.recorder.record(&result, snapshot).await;
            }
        }

        info!(
            run_id,
            completed = result.snapshot_completed,
            delayed = result.snapshot_delayed,
            deleted = result.deleted_snapshots.len(),
            not_deleted = result.failed_deletions.len(),
            "snapshot manager run finished"
        );
        result
    }
}
