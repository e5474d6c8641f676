//! In-memory fakes for the collaborator traits.

use crate::audit::{AuditRecord, AuditStore};
use crate::clock::Clock;
use crate::control_plane::{ControlPlane, SnapshotPage};
use crate::error::{AuditError, ControlPlaneError, NotifyError};
use crate::notify::{MessageId, NotificationSink};
use crate::types::{ApplicationDescriptor, ApplicationStatus, SnapshotRecord, VersionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Scripted control plane.
///
/// Listing calls are answered from the queued responses first (one response
/// per call, pagination tokens included); once the queue is empty, every
/// call gets a single final page holding the steady-state snapshot set.
#[derive(Debug, Default)]
pub struct FakeControlPlane {
    state: Mutex<ControlPlaneState>,
}

#[derive(Debug, Default)]
struct ControlPlaneState {
    descriptor: Option<ApplicationDescriptor>,
    describe_error: Option<ControlPlaneError>,
    create_error: Option<ControlPlaneError>,
    snapshots: Vec<SnapshotRecord>,
    list_responses: VecDeque<Result<SnapshotPage, ControlPlaneError>>,
    failing_deletes: HashSet<String>,
    create_calls: Vec<String>,
    delete_calls: Vec<String>,
    list_calls: u32,
}

impl FakeControlPlane {
    /// A control plane hosting a running application at `version_id`, with
    /// an empty snapshot directory.
    pub fn running(_app_name: &str, version_id: VersionId) -> Self {
        let fake = Self::default();
        fake.state.lock().descriptor = Some(ApplicationDescriptor {
            status: ApplicationStatus::Running,
            version_id,
        });
        fake
    }

    /// Set the descriptor returned by `describe_application`.
    pub fn set_descriptor(&self, descriptor: ApplicationDescriptor) {
        self.state.lock().descriptor = Some(descriptor);
    }

    /// Make every `describe_application` call fail.
    pub fn fail_describe(&self, error: ControlPlaneError) {
        self.state.lock().describe_error = Some(error);
    }

    /// Make every `create_snapshot` call fail.
    pub fn fail_create(&self, error: ControlPlaneError) {
        self.state.lock().create_error = Some(error);
    }

    /// Replace the steady-state snapshot directory.
    pub fn set_snapshots(&self, snapshots: Vec<SnapshotRecord>) {
        self.state.lock().snapshots = snapshots;
    }

    /// Queue one scripted response for the next `list_snapshots` call.
    pub fn queue_list_response(&self, response: Result<SnapshotPage, ControlPlaneError>) {
        self.state.lock().list_responses.push_back(response);
    }

    /// Make deletion of the named snapshot fail.
    pub fn fail_delete_of(&self, snapshot_name: &str) {
        self.state
            .lock()
            .failing_deletes
            .insert(snapshot_name.to_string());
    }

    /// Snapshot names passed to `create_snapshot`, in call order.
    pub fn create_calls(&self) -> Vec<String> {
        self.state.lock().create_calls.clone()
    }

    /// Snapshot names passed to `delete_snapshot`, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().delete_calls.clone()
    }

    /// Number of `list_snapshots` calls observed.
    pub fn list_calls(&self) -> u32 {
        self.state.lock().list_calls
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn describe_application(
        &self,
        app_name: &str,
    ) -> Result<ApplicationDescriptor, ControlPlaneError> {
        let state = self.state.lock();
        if let Some(error) = &state.describe_error {
            return Err(error.clone());
        }
        state
            .descriptor
            .ok_or_else(|| ControlPlaneError::NotFound(app_name.to_string()))
    }

    async fn create_snapshot(
        &self,
        _app_name: &str,
        snapshot_name: &str,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        state.create_calls.push(snapshot_name.to_string());
        if let Some(error) = &state.create_error {
            return Err(error.clone());
        }
        Ok(())
    }

    async fn list_snapshots(
        &self,
        _app_name: &str,
        _page_token: Option<&str>,
    ) -> Result<SnapshotPage, ControlPlaneError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        match state.list_responses.pop_front() {
            Some(response) => response,
            None => Ok(SnapshotPage::last(state.snapshots.clone())),
        }
    }

    async fn delete_snapshot(
        &self,
        _app_name: &str,
        snapshot_name: &str,
        _created_at: DateTime<Utc>,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        state.delete_calls.push(snapshot_name.to_string());
        if state.failing_deletes.contains(snapshot_name) {
            return Err(ControlPlaneError::Transient(format!(
                "deletion of {snapshot_name} refused"
            )));
        }
        state.snapshots.retain(|s| s.name != snapshot_name);
        Ok(())
    }
}

/// Audit store that records written rows.
#[derive(Debug, Default)]
pub struct FakeAuditStore {
    records: Mutex<Vec<AuditRecord>>,
    error: Mutex<Option<AuditError>>,
}

impl FakeAuditStore {
    /// Make every `put_record` call fail.
    pub fn fail_put(&self, error: AuditError) {
        *self.error.lock() = Some(error);
    }

    /// Rows written so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AuditStore for FakeAuditStore {
    async fn put_record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        if let Some(error) = self.error.lock().clone() {
            return Err(error);
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Notification sink that records published (subject, message) pairs.
#[derive(Debug, Default)]
pub struct FakeNotificationSink {
    published: Mutex<Vec<(String, String)>>,
    error: Mutex<Option<NotifyError>>,
}

impl FakeNotificationSink {
    /// Make every `publish` call fail.
    pub fn fail_publish(&self, error: NotifyError) {
        *self.error.lock() = Some(error);
    }

    /// Messages published so far.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().clone()
    }

    /// Message bodies published so far.
    pub fn messages(&self) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for FakeNotificationSink {
    async fn publish(&self, subject: &str, message: &str) -> Result<MessageId, NotifyError> {
        if let Some(error) = self.error.lock().clone() {
            return Err(error);
        }
        let mut published = self.published.lock();
        published.push((subject.to_string(), message.to_string()));
        Ok(format!("message-{}", published.len()))
    }
}

/// Deterministic clock. `sleep` records the requested duration and advances
/// the clock by it instead of suspending.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_millis: AtomicU64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now_millis: AtomicU64::new(start_millis),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Durations passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.now_millis() as i64)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.now_millis
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}
