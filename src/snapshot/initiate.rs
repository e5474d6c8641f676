//! Snapshot initiation.

use crate::control_plane::ControlPlane;
use crate::error::ControlPlaneError;
use std::sync::Arc;
use tracing::{info, warn};

/// Typed outcome of an initiation request. Initiation never propagates an
/// error past the orchestrator boundary; refusals are represented here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiationOutcome {
    /// Name the snapshot was requested under.
    pub snapshot_name: String,

    /// Whether the control plane accepted the request. Acknowledgement, not
    /// completion.
    pub initiated: bool,

    /// Diagnostic from the control plane when the request was refused.
    pub error_message: Option<String>,
}

/// Requests creation of a new snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotInitiator {
    control_plane: Arc<dyn ControlPlane>,
}

impl SnapshotInitiator {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Ask the control plane to start a snapshot under `snapshot_name`.
    pub async fn initiate(&self, app_name: &str, snapshot_name: &str) -> InitiationOutcome {
        match self
            .control_plane
            .create_snapshot(app_name, snapshot_name)
            .await
        {
            Ok(()) => {
                info!(app = %app_name, snapshot = %snapshot_name, "snapshot creation initiated");
                InitiationOutcome {
                    snapshot_name: snapshot_name.to_string(),
                    initiated: true,
                    error_message: None,
                }
            }
            Err(ControlPlaneError::NotFound(msg)) => {
                warn!(app = %app_name, "application not found");
                Self::refused(snapshot_name, msg)
            }
            Err(ControlPlaneError::InvalidRequest(msg)) => {
                warn!(app = %app_name, error = %msg, "snapshot request rejected");
                Self::refused(snapshot_name, msg)
            }
            Err(ControlPlaneError::Transient(msg)) => {
                warn!(app = %app_name, error = %msg, "control plane failure during initiation");
                Self::refused(snapshot_name, msg)
            }
        }
    }

    fn refused(snapshot_name: &str, message: String) -> InitiationOutcome {
        InitiationOutcome {
            snapshot_name: snapshot_name.to_string(),
            initiated: false,
            error_message: Some(message),
        }
    }
}
