//! Bounded completion polling for a newly initiated snapshot.

use crate::clock::Clock;
use crate::snapshot::SnapshotDirectory;
use crate::types::{SnapshotRecord, SnapshotStatus, VersionId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum number of directory checks per initiated snapshot. Bounded so a
/// slow snapshot cannot block past the host's invocation timeout.
pub const MAX_POLL_ATTEMPTS: u32 = 4;

/// State of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Initiation acknowledged; the snapshot was seen but is not ready yet.
    Waiting,

    /// The most recent directory entry was not the initiated snapshot.
    NotFoundYet,

    /// The initiated snapshot reached its terminal ready state.
    Ready,

    /// Every attempt was consumed without the snapshot becoming ready.
    TimedOut,
}

/// Result of a finished poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Terminal state: `Ready` or `TimedOut`.
    pub state: PollState,

    /// Attempts consumed, including the one that observed readiness.
    pub attempts_used: u32,

    /// The directory record of the initiated snapshot when the poll ended
    /// in `Ready`.
    pub snapshot: Option<SnapshotRecord>,
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        self.state == PollState::Ready
    }
}

/// Waits for a newly initiated snapshot to become ready.
///
/// Each attempt sleeps a fixed interval, lists the directory for the
/// current application version, and inspects only the most recent record by
/// creation time. Inspecting the latest record instead of searching the
/// whole listing tolerates propagation reorder, but assumes the newest
/// timestamp belongs to the just-created snapshot once it appears; a
/// concurrent external snapshot creation racing this run breaks that
/// assumption.
#[derive(Debug, Clone)]
pub struct CompletionPoller {
    directory: SnapshotDirectory,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl CompletionPoller {
    pub fn new(directory: SnapshotDirectory, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            directory,
            clock,
            interval,
        }
    }

    /// Poll until the snapshot named `snapshot_name` is ready or the
    /// attempt budget is spent. One attempt is consumed per iteration
    /// whether or not the snapshot is visible yet.
    pub async fn wait_for_ready(
        &self,
        app_name: &str,
        version_id: VersionId,
        snapshot_name: &str,
    ) -> PollOutcome {
        let mut attempts = 0u32;

        while attempts < MAX_POLL_ATTEMPTS {
            self.clock.sleep(self.interval).await;
            attempts += 1;

            let listed = self.directory.list_for_version(app_name, version_id).await;
            let (state, snapshot) = Self::classify(listed, snapshot_name);
            debug!(
                app = %app_name,
                snapshot = %snapshot_name,
                attempt = attempts,
                ?state,
                "poll attempt"
            );

            match state {
                PollState::Ready => {
                    info!(snapshot = %snapshot_name, attempts, "snapshot ready");
                    return PollOutcome {
                        state,
                        attempts_used: attempts,
                        snapshot,
                    };
                }
                PollState::NotFoundYet => {
                    debug!(snapshot = %snapshot_name, "initiated snapshot not visible yet");
                }
                _ => {}
            }
        }

        warn!(snapshot = %snapshot_name, attempts, "snapshot did not become ready in time");
        PollOutcome {
            state: PollState::TimedOut,
            attempts_used: attempts,
            snapshot: None,
        }
    }

    /// Classify one directory listing against the initiated snapshot name.
    /// Only the most recent record by creation time is inspected; the match
    /// is by name alone.
    fn classify(
        mut listed: Vec<SnapshotRecord>,
        snapshot_name: &str,
    ) -> (PollState, Option<SnapshotRecord>) {
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let Some(latest) = listed.into_iter().next() else {
            return (PollState::NotFoundYet, None);
        };
        if latest.name != snapshot_name {
            return (PollState::NotFoundYet, None);
        }
        if latest.status == SnapshotStatus::Ready {
            (PollState::Ready, Some(latest))
        } else {
            (PollState::Waiting, Some(latest))
        }
    }
}
