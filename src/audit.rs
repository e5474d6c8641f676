//! Audit trail for completed runs.
//!
//! One record per run that produced a ready snapshot, keyed by
//! (application, run id). The audit store is a side channel: a failed write
//! is logged and the run result already computed is not rolled back.

use crate::error::AuditError;
use crate::types::{RunId, RunResult, SnapshotRecord, VersionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// One audit row. The partition key is the application name; the sort key
/// is the run id, so rows order by invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Partition key value.
    pub app_name: String,

    /// Sort key value.
    pub run_id: RunId,

    /// Name of the snapshot created this run.
    pub new_snapshot_name: String,

    /// Creation time of the new snapshot.
    pub new_snapshot_create_time: DateTime<Utc>,

    /// Application version the new snapshot belongs to.
    pub app_version_id: VersionId,

    /// Names of snapshots deleted this run, serialized as text. Absent when
    /// none were deleted.
    pub snapshots_deleted: Option<String>,

    /// Names of snapshots that could not be deleted, serialized as text.
    /// Absent when there were no failures.
    pub snapshots_failed_to_be_deleted: Option<String>,
}

impl AuditRecord {
    /// Assemble the record for a completed run. `new_snapshot` is the
    /// directory record of the snapshot this run created.
    pub fn for_run(result: &RunResult, new_snapshot: &SnapshotRecord) -> Self {
        Self {
            app_name: result.app_name.clone(),
            run_id: result.run_id,
            new_snapshot_name: new_snapshot.name.clone(),
            new_snapshot_create_time: new_snapshot.created_at,
            app_version_id: new_snapshot.version_id,
            snapshots_deleted: serialize_names(&result.deleted_snapshots),
            snapshots_failed_to_be_deleted: serialize_names(&result.failed_deletions),
        }
    }
}

fn serialize_names(records: &[SnapshotRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let names: Vec<&str> = records.iter().map(|s| s.name.as_str()).collect();
    Some(names.join(", "))
}

/// Key-value audit store with a single write operation.
#[async_trait]
pub trait AuditStore: Send + Sync + std::fmt::Debug {
    async fn put_record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Writes one audit record per successful run.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Assemble and persist the record for a completed run. Returns whether
    /// the write was accepted; failures are logged only.
    pub async fn record(&self, result: &RunResult, new_snapshot: &SnapshotRecord) -> bool {
        let record = AuditRecord::for_run(result, new_snapshot);
        match self.store.put_record(&record).await {
            Ok(()) => {
                info!(
                    app = %record.app_name,
                    run_id = record.run_id,
                    "audit record written"
                );
                true
            }
            Err(e) => {
                error!(
                    app = %record.app_name,
                    run_id = record.run_id,
                    error = %e,
                    "failed to write audit record"
                );
                false
            }
        }
    }
}
