//! Snapshot directory listing.

use crate::control_plane::ControlPlane;
use crate::types::{SnapshotRecord, VersionId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read side of the control plane's snapshot listing.
///
/// Follows pagination continuation tokens until the listing is exhausted
/// and keeps only records of the requested application version. Fails open:
/// a listing error returns whatever has been collected so far, so callers
/// must tolerate an undercount.
#[derive(Debug, Clone)]
pub struct SnapshotDirectory {
    control_plane: Arc<dyn ControlPlane>,
}

impl SnapshotDirectory {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// List all snapshots of `version_id`, unordered.
    pub async fn list_for_version(
        &self,
        app_name: &str,
        version_id: VersionId,
    ) -> Vec<SnapshotRecord> {
        let mut collected = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .control_plane
                .list_snapshots(app_name, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        app = %app_name,
                        error = %e,
                        collected = collected.len(),
                        "snapshot listing failed, returning partial results"
                    );
                    break;
                }
            };

            collected.extend(
                page.snapshots
                    .into_iter()
                    .filter(|s| s.version_id == version_id),
            );

            match page.next_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(app = %app_name, version_id, count = collected.len(), "listed snapshots");
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_plane::SnapshotPage;
    use crate::error::ControlPlaneError;
    use crate::testing::FakeControlPlane;
    use crate::types::SnapshotStatus;
    use chrono::Utc;

    fn record(name: &str, version_id: VersionId) -> SnapshotRecord {
        SnapshotRecord::new(name, version_id, Utc::now(), SnapshotStatus::Ready)
    }

    #[tokio::test]
    async fn test_follows_pagination_and_filters_by_version() {
        let control_plane = Arc::new(FakeControlPlane::running("orders-enrichment", 3));
        control_plane.queue_list_response(Ok(SnapshotPage {
            snapshots: vec![record("custom_1", 3), record("custom_2", 2)],
            next_token: Some("p2".to_string()),
        }));
        control_plane.queue_list_response(Ok(SnapshotPage::last(vec![
            record("custom_3", 3),
            record("custom_4", 3),
        ])));

        let directory = SnapshotDirectory::new(control_plane.clone());
        let listed = directory.list_for_version("orders-enrichment", 3).await;

        let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["custom_1", "custom_3", "custom_4"]);
        assert_eq!(control_plane.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_fails_open_with_partial_results() {
        let control_plane = Arc::new(FakeControlPlane::running("orders-enrichment", 3));
        control_plane.queue_list_response(Ok(SnapshotPage {
            snapshots: vec![record("custom_1", 3)],
            next_token: Some("p2".to_string()),
        }));
        control_plane.queue_list_response(Err(ControlPlaneError::Transient("throttled".into())));

        let directory = SnapshotDirectory::new(control_plane);
        let listed = directory.list_for_version("orders-enrichment", 3).await;

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "custom_1");
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let control_plane = Arc::new(FakeControlPlane::running("orders-enrichment", 3));
        let directory = SnapshotDirectory::new(control_plane);

        let listed = directory.list_for_version("orders-enrichment", 3).await;
        assert!(listed.is_empty());
    }
}
