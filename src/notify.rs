//! Operator notifications.
//!
//! Four message templates, published to a single operator channel. Every
//! publish is best-effort: failures are logged, never retried, and never
//! abort the run.

use crate::error::NotifyError;
use crate::types::{RunId, SnapshotRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Subject line attached to every operator alert.
pub const ALERT_SUBJECT: &str = "Snapshot Manager Alert";

/// Identifier assigned to a published message by the channel.
pub type MessageId = String;

/// Publish-only message sink.
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug {
    async fn publish(&self, subject: &str, message: &str) -> Result<MessageId, NotifyError>;
}

/// Composes and publishes operator alerts.
#[derive(Debug, Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Notice that no snapshot was taken because the application is not
    /// running.
    pub async fn app_not_running(&self, run_id: RunId, app_name: &str) {
        self.publish(&not_running_message(run_id, app_name)).await;
    }

    /// Notice that the application's health could not be confirmed.
    pub async fn app_unhealthy(&self, run_id: RunId, app_name: &str) {
        self.publish(&unhealthy_message(run_id, app_name)).await;
    }

    /// Run summary after the new snapshot completed, pointing at the audit
    /// record for deletion detail.
    pub async fn run_succeeded(&self, run_id: RunId, app_name: &str, snapshot: &SnapshotRecord) {
        self.publish(&success_message(run_id, app_name, snapshot))
            .await;
    }

    /// Run summary after the new snapshot missed its completion window or
    /// failed.
    pub async fn run_delayed(
        &self,
        run_id: RunId,
        app_name: &str,
        snapshot_name: &str,
        attempted_at: DateTime<Utc>,
    ) {
        self.publish(&delayed_message(run_id, app_name, snapshot_name, attempted_at))
            .await;
    }

    async fn publish(&self, message: &str) {
        match self.sink.publish(ALERT_SUBJECT, message).await {
            Ok(message_id) => {
                info!(message_id = %message_id, "alert published");
            }
            Err(NotifyError::ChannelNotFound(channel)) => {
                warn!(channel = %channel, "notification channel not found");
            }
            Err(e) => {
                warn!(error = %e, "failed to publish alert");
            }
        }
    }
}

fn not_running_message(run_id: RunId, app_name: &str) -> String {
    format!(
        "Application Team:\n\n\
         Snapshot Manager execution completed. Run Id: {run_id}. However, a new \
         snapshot has not been taken. The application {app_name} is not running."
    )
}

fn unhealthy_message(run_id: RunId, app_name: &str) -> String {
    format!(
        "Application Team:\n\n\
         Snapshot Manager execution completed. Run Id: {run_id}. However, a new \
         snapshot has not been taken. The application {app_name} may not be healthy."
    )
}

fn success_message(run_id: RunId, app_name: &str, snapshot: &SnapshotRecord) -> String {
    format!(
        "Application Team:\n\n\
         Snapshot Manager execution completed. Run Id: {run_id}.\n\n\
         New snapshot creation details:\n\
         - Application Name: {app_name}\n\
         - Snapshot Name: {name}\n\
         - Application Version Id: {version}\n\
         - Snapshot Creation Time: {created}\n\n\
         Historical snapshot(s) deletion status:\n\
         - Refer to the audit table for details. Partition key: {app_name}, sort key: {run_id}.",
        name = snapshot.name,
        version = snapshot.version_id,
        created = snapshot.created_at,
    )
}

fn delayed_message(
    run_id: RunId,
    app_name: &str,
    snapshot_name: &str,
    attempted_at: DateTime<Utc>,
) -> String {
    format!(
        "Application Team:\n\n\
         Snapshot Manager execution completed. Run Id: {run_id}. However, the \
         snapshot creation process either did not complete on time or failed. \
         Please investigate the application's snapshot section and recent logs. \
         Below are the details:\n\
         - Application Name: {app_name}\n\
         - Snapshot Name: {snapshot_name}\n\
         - Snapshot creation attempted at: {attempted_at}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::testing::FakeNotificationSink;
    use crate::types::SnapshotStatus;
    use chrono::TimeZone;

    #[test]
    fn test_success_message_contents() {
        let snapshot = SnapshotRecord::new(
            "custom_1700000000123",
            7,
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            SnapshotStatus::Ready,
        );
        let message = success_message(1700000000123, "orders-enrichment", &snapshot);

        assert!(message.contains("Run Id: 1700000000123"));
        assert!(message.contains("Snapshot Name: custom_1700000000123"));
        assert!(message.contains("Application Version Id: 7"));
        assert!(message.contains("Partition key: orders-enrichment"));
    }

    #[test]
    fn test_delayed_message_contents() {
        let attempted_at = Utc.timestamp_opt(1_700_000_120, 0).unwrap();
        let message = delayed_message(42, "orders-enrichment", "custom_42", attempted_at);

        assert!(message.contains("did not complete on time or failed"));
        assert!(message.contains("Snapshot Name: custom_42"));
        assert!(message.contains("2023-11-14 22:15:20 UTC"));
    }

    #[tokio::test]
    async fn test_alerts_carry_the_fixed_subject() {
        let sink = Arc::new(FakeNotificationSink::default());
        let notifier = Notifier::new(sink.clone());

        notifier.app_not_running(42, "orders-enrichment").await;

        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, ALERT_SUBJECT);
        assert!(published[0].1.contains("is not running"));
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let sink = Arc::new(FakeNotificationSink::default());
        sink.fail_publish(NotifyError::PublishFailed("boom".into()));
        let notifier = Notifier::new(sink.clone());

        // Must not panic or propagate.
        notifier.app_unhealthy(42, "orders-enrichment").await;
        assert!(sink.published().is_empty());
    }
}
