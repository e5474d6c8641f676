//! Core types used throughout the snapshot manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of one control-loop run.
///
/// Captured once at run start as a millisecond epoch timestamp and used both
/// as the new snapshot's name suffix and as the audit record's sort key.
/// Uniqueness relies on wall-clock resolution: two invocations racing within
/// the same millisecond collide on the audit key. Overlapping invocations
/// are not coordinated by this crate.
pub type RunId = u64;

/// Version identifier of the monitored application. Opaque to the core; the
/// control plane increments it on application updates.
pub type VersionId = u64;

/// Prefix of snapshot names minted by the control loop.
pub const SNAPSHOT_NAME_PREFIX: &str = "custom_";

/// Snapshot name for a run: `custom_<run_id>`.
pub fn snapshot_name_for_run(run_id: RunId) -> String {
    format!("{SNAPSHOT_NAME_PREFIX}{run_id}")
}

/// Run status of the monitored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// The application is running and can be snapshotted.
    Running,

    /// The application is stopped, starting, or otherwise not running.
    NotRunning,

    /// Any status the control plane reports that is neither of the above,
    /// and the stand-in when the status could not be determined at all.
    Other,
}

impl ApplicationStatus {
    /// Map a raw control-plane status string. Unrecognized values are
    /// `Other`, never an error.
    pub fn from_control_plane(raw: &str) -> Self {
        match raw {
            "RUNNING" => ApplicationStatus::Running,
            "READY" | "STARTING" | "STOPPING" | "STOPPED" => ApplicationStatus::NotRunning,
            _ => ApplicationStatus::Other,
        }
    }

    /// Whether a snapshot can be initiated in this status.
    pub fn is_running(&self) -> bool {
        matches!(self, ApplicationStatus::Running)
    }
}

/// Read-only snapshot of the monitored application at orchestration start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Current run status.
    pub status: ApplicationStatus,

    /// Active version identifier.
    pub version_id: VersionId,
}

impl ApplicationDescriptor {
    /// Descriptor for an application whose state could not be determined.
    /// No field is left undefined: the status resolves to `Other`.
    pub fn unknown() -> Self {
        Self {
            status: ApplicationStatus::Other,
            version_id: 0,
        }
    }
}

/// Lifecycle status of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    /// Creation has been accepted and is underway.
    InProgress,

    /// Terminal: the snapshot is complete and usable.
    Ready,

    /// Terminal: creation failed.
    Failed,

    /// Any other status reported by the control plane.
    Other,
}

impl SnapshotStatus {
    /// Map a raw control-plane status string. Unrecognized values are
    /// `Other`, never an error.
    pub fn from_control_plane(raw: &str) -> Self {
        match raw {
            "CREATING" | "IN_PROGRESS" => SnapshotStatus::InProgress,
            "READY" | "COMPLETED" => SnapshotStatus::Ready,
            "FAILED" => SnapshotStatus::Failed,
            _ => SnapshotStatus::Other,
        }
    }
}

/// One snapshot as reported by the control plane's directory.
///
/// Owned by the control plane; the core only reads and deletes by reference.
/// "Is this the snapshot this run created" comparisons go by `name` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Snapshot name, unique per application.
    pub name: String,

    /// Application version the snapshot belongs to.
    pub version_id: VersionId,

    /// When creation started.
    pub created_at: DateTime<Utc>,

    /// Current lifecycle status.
    pub status: SnapshotStatus,
}

impl SnapshotRecord {
    /// Create a record.
    pub fn new(
        name: impl Into<String>,
        version_id: VersionId,
        created_at: DateTime<Utc>,
        status: SnapshotStatus,
    ) -> Self {
        Self {
            name: name.into(),
            version_id,
            created_at,
            status,
        }
    }
}

/// Accumulated outcome of one control-loop run.
///
/// Created fresh per invocation, fully derived by the orchestrator, and
/// discarded after being serialized into the invocation response and,
/// selectively, into an audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Identifier of this run.
    pub run_id: RunId,

    /// Name of the monitored application.
    pub app_name: String,

    /// Active application version observed at run start; zero when the
    /// probe could not determine it.
    pub app_version: VersionId,

    /// Name of the snapshot this run attempted to create.
    pub new_snapshot_name: String,

    /// Whether the application was running at run start.
    pub app_running: bool,

    /// Whether the application could be confirmed healthy. Cleared when the
    /// probe fails or initiation is refused.
    pub app_healthy: bool,

    /// Whether the control plane acknowledged the snapshot request.
    pub snapshot_initiated: bool,

    /// Whether the new snapshot reached its ready state in time.
    pub snapshot_completed: bool,

    /// Whether the new snapshot missed the completion window.
    pub snapshot_delayed: bool,

    /// Whether the directory exceeded the retention count after completion.
    pub prune_needed: bool,

    /// Excess snapshots deleted this run. Disjoint from `failed_deletions`;
    /// together the two lists are exactly the pruner's excess set.
    pub deleted_snapshots: Vec<SnapshotRecord>,

    /// Excess snapshots whose deletion was refused.
    pub failed_deletions: Vec<SnapshotRecord>,
}

impl RunResult {
    /// Fresh result for a run. The application is presumed running and
    /// healthy until observed otherwise.
    pub fn new(run_id: RunId, app_name: impl Into<String>) -> Self {
        Self {
            run_id,
            app_name: app_name.into(),
            app_version: 0,
            new_snapshot_name: snapshot_name_for_run(run_id),
            app_running: true,
            app_healthy: true,
            snapshot_initiated: false,
            snapshot_completed: false,
            snapshot_delayed: false,
            prune_needed: false,
            deleted_snapshots: Vec::new(),
            failed_deletions: Vec::new(),
        }
    }

    /// Serializable report for the invocation response body.
    pub fn report(&self) -> RunReport {
        RunReport {
            app_name: self.app_name.clone(),
            app_version: self.app_version,
            snapshot_manager_run_id: self.run_id,
            new_snapshot_name: self.new_snapshot_name.clone(),
            app_is_running: self.app_running,
            app_is_healthy: self.app_healthy,
            new_snapshot_initiated: self.snapshot_initiated,
            new_snapshot_completed: self.snapshot_completed,
            new_snapshot_creation_delayed: self.snapshot_delayed,
            old_snapshots_to_be_deleted: self.prune_needed,
            num_of_snapshot_deleted: self.deleted_snapshots.len(),
            num_of_snapshot_not_deleted: self.failed_deletions.len(),
        }
    }
}

/// Serialized form of a [`RunResult`]: all run flags plus deletion counts.
/// This is the durable source of truth for automation consuming the
/// invocation's return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub app_name: String,
    pub app_version: VersionId,
    pub snapshot_manager_run_id: RunId,
    pub new_snapshot_name: String,
    pub app_is_running: bool,
    pub app_is_healthy: bool,
    pub new_snapshot_initiated: bool,
    pub new_snapshot_completed: bool,
    pub new_snapshot_creation_delayed: bool,
    pub old_snapshots_to_be_deleted: bool,
    pub num_of_snapshot_deleted: usize,
    pub num_of_snapshot_not_deleted: usize,
}

/// Invocation response envelope. The control loop always answers 200; every
/// failure mode is represented inside the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_name_for_run() {
        assert_eq!(snapshot_name_for_run(1700000000123), "custom_1700000000123");
    }

    #[test]
    fn test_application_status_mapping() {
        assert_eq!(
            ApplicationStatus::from_control_plane("RUNNING"),
            ApplicationStatus::Running
        );
        assert_eq!(
            ApplicationStatus::from_control_plane("STOPPED"),
            ApplicationStatus::NotRunning
        );
        assert_eq!(
            ApplicationStatus::from_control_plane("MAINTENANCE"),
            ApplicationStatus::Other
        );
        assert!(!ApplicationStatus::Other.is_running());
    }

    #[test]
    fn test_snapshot_status_mapping() {
        assert_eq!(
            SnapshotStatus::from_control_plane("CREATING"),
            SnapshotStatus::InProgress
        );
        assert_eq!(
            SnapshotStatus::from_control_plane("READY"),
            SnapshotStatus::Ready
        );
        assert_eq!(
            SnapshotStatus::from_control_plane("EXPIRED"),
            SnapshotStatus::Other
        );
    }

    #[test]
    fn test_fresh_run_result_flags() {
        let result = RunResult::new(42, "orders-enrichment");
        assert!(result.app_running);
        assert!(result.app_healthy);
        assert!(!result.snapshot_initiated);
        assert!(!result.snapshot_completed);
        assert!(!result.snapshot_delayed);
        assert!(!result.prune_needed);
        assert_eq!(result.new_snapshot_name, "custom_42");
    }

    #[test]
    fn test_report_counts_deletions() {
        let mut result = RunResult::new(7, "orders-enrichment");
        result.deleted_snapshots = vec![
            SnapshotRecord::new("custom_1", 3, Utc::now(), SnapshotStatus::Ready),
            SnapshotRecord::new("custom_2", 3, Utc::now(), SnapshotStatus::Ready),
        ];
        result.failed_deletions =
            vec![SnapshotRecord::new("custom_3", 3, Utc::now(), SnapshotStatus::Ready)];

        let report = result.report();
        assert_eq!(report.num_of_snapshot_deleted, 2);
        assert_eq!(report.num_of_snapshot_not_deleted, 1);
        assert_eq!(report.snapshot_manager_run_id, 7);
    }

    #[test]
    fn test_response_serializes_status_code_field() {
        let response = Response {
            status_code: 200,
            body: "{}".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"statusCode\":200"));
    }
}
