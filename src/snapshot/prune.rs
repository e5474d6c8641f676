//! Retention pruning of historical snapshots.

use crate::control_plane::ControlPlane;
use crate::types::SnapshotRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one pruning pass.
///
/// `deleted` and `failed` are disjoint and together are exactly the excess
/// set selected by [`RetentionPruner::plan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Snapshots whose deletion was accepted.
    pub deleted: Vec<SnapshotRecord>,

    /// Snapshots whose deletion was refused. Not retried within the run.
    pub failed: Vec<SnapshotRecord>,
}

/// Deletes the oldest snapshots beyond the retention count.
///
/// Callers only invoke this after the run's new snapshot is confirmed
/// ready, against a fresh directory listing.
#[derive(Debug, Clone)]
pub struct RetentionPruner {
    control_plane: Arc<dyn ControlPlane>,
}

impl RetentionPruner {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Select the excess records: everything past the `retain_count` newest
    /// by creation time. Pure selection; deletion is submitted separately.
    pub fn plan(records: &[SnapshotRecord], retain_count: usize) -> Vec<SnapshotRecord> {
        if records.len() <= retain_count {
            return Vec::new();
        }
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.split_off(retain_count)
    }

    /// Submit every excess record for deletion, classifying each outcome.
    /// Failures are recorded, not retried.
    pub async fn prune(
        &self,
        app_name: &str,
        records: &[SnapshotRecord],
        retain_count: usize,
    ) -> PruneOutcome {
        let excess = Self::plan(records, retain_count);
        info!(
            app = %app_name,
            total = records.len(),
            retain = retain_count,
            excess = excess.len(),
            "pruning excess snapshots"
        );

        let mut outcome = PruneOutcome::default();
        for snapshot in excess {
            match self
                .control_plane
                .delete_snapshot(app_name, &snapshot.name, snapshot.created_at)
                .await
            {
                Ok(()) => {
                    info!(app = %app_name, snapshot = %snapshot.name, "snapshot deleted");
                    outcome.deleted.push(snapshot);
                }
                Err(e) => {
                    warn!(
                        app = %app_name,
                        snapshot = %snapshot.name,
                        error = %e,
                        "failed to delete snapshot"
                    );
                    outcome.failed.push(snapshot);
                }
            }
        }
        outcome
    }
}
