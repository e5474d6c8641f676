//! Application status probe.

use crate::control_plane::ControlPlane;
use crate::error::ControlPlaneError;
use crate::types::ApplicationDescriptor;
use std::sync::Arc;
use tracing::{error, warn};

/// Result of probing the application at orchestration start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Observed status and version. When the probe failed, the status is
    /// `Other` and the version is zero.
    pub descriptor: ApplicationDescriptor,

    /// True when the control plane could not confirm the application's
    /// state, which the orchestrator treats as a health signal.
    pub probe_failed: bool,
}

/// Queries the monitored application's run status and active version.
#[derive(Debug, Clone)]
pub struct StatusProber {
    control_plane: Arc<dyn ControlPlane>,
}

impl StatusProber {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Probe the application. Never fails the run: a control-plane error
    /// degrades the outcome to an unknown status instead of aborting.
    pub async fn probe(&self, app_name: &str) -> ProbeOutcome {
        match self.control_plane.describe_application(app_name).await {
            Ok(descriptor) => ProbeOutcome {
                descriptor,
                probe_failed: false,
            },
            Err(ControlPlaneError::NotFound(_)) => {
                warn!(app = %app_name, "application not found");
                ProbeOutcome {
                    descriptor: ApplicationDescriptor::unknown(),
                    probe_failed: true,
                }
            }
            Err(e) => {
                error!(app = %app_name, error = %e, "failed to describe application");
                ProbeOutcome {
                    descriptor: ApplicationDescriptor::unknown(),
                    probe_failed: true,
                }
            }
        }
    }
}
