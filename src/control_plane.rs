//! Narrow interface to the application control plane.
//!
//! The service that owns applications and their snapshots is an external
//! collaborator. The core consumes only this trait; implementations wrap
//! the vendor SDK and translate its failures into [`ControlPlaneError`].

use crate::error::ControlPlaneError;
use crate::types::{ApplicationDescriptor, SnapshotRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One page of a snapshot listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPage {
    /// Records on this page, across all application versions.
    pub snapshots: Vec<SnapshotRecord>,

    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

impl SnapshotPage {
    /// A single, final page.
    pub fn last(snapshots: Vec<SnapshotRecord>) -> Self {
        Self {
            snapshots,
            next_token: None,
        }
    }
}

/// Query/command surface of the snapshot control plane.
#[async_trait]
pub trait ControlPlane: Send + Sync + std::fmt::Debug {
    /// Current run status and active version of the application.
    async fn describe_application(
        &self,
        app_name: &str,
    ) -> Result<ApplicationDescriptor, ControlPlaneError>;

    /// Request creation of a snapshot. Success is a synchronous
    /// acknowledgement of the request, not completion of the snapshot.
    async fn create_snapshot(
        &self,
        app_name: &str,
        snapshot_name: &str,
    ) -> Result<(), ControlPlaneError>;

    /// Fetch one page of the application's snapshot listing.
    async fn list_snapshots(
        &self,
        app_name: &str,
        page_token: Option<&str>,
    ) -> Result<SnapshotPage, ControlPlaneError>;

    /// Delete a snapshot identified by name and creation timestamp.
    async fn delete_snapshot(
        &self,
        app_name: &str,
        snapshot_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), ControlPlaneError>;
}
