//! Snapshot lifecycle manager for long-running streaming applications.
//!
//! Each invocation runs one bounded control loop against the application's
//! snapshot control plane: trigger a new snapshot, wait for it to become
//! ready, enforce the retention policy over historical snapshots, alert the
//! operator channel, and persist an audit record.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SnapshotManager                         │
//! │                                                             │
//! │  probe ──▶ initiate ──▶ poll (≤4 × interval) ──▶ prune      │
//! │    │           │             │                     │        │
//! │    └───────────┴──── notify (best effort) ─────────┘        │
//! │                              │                              │
//! │                            audit (iff completed)            │
//! └─────────────────────────────────────────────────────────────┘
//!          │                     │                    │
//!          ▼                     ▼                    ▼
//!   ┌─────────────┐       ┌────────────┐      ┌──────────────┐
//!   │ControlPlane │       │ AuditStore │      │Notification- │
//!   │   (trait)   │       │  (trait)   │      │ Sink (trait) │
//!   └─────────────┘       └────────────┘      └──────────────┘
//! ```
//!
//! - **Probe**: read the application's run status and active version.
//! - **Initiate**: request a snapshot named `custom_<run_id>`; the run id
//!   is a millisecond epoch captured once at run start.
//! - **Poll**: up to four fixed-interval checks of the snapshot directory,
//!   inspecting only the most recent entry.
//! - **Prune**: after completion, delete the oldest snapshots beyond the
//!   retention count; failures are recorded, not retried.
//! - **Audit**: one record per completed run, keyed by (application, run id).
//!
//! Every external service sits behind a narrow trait, so the loop can be
//! driven against the fakes in [`testing`] without a control plane, audit
//! store, notification channel, or real time.
//!
//! # Example
//!
//! ```rust,no_run
//! use snapman::testing::{FakeAuditStore, FakeControlPlane, FakeNotificationSink};
//! use snapman::{SnapshotManager, SnapshotManagerConfig, SystemClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> snapman::Result<()> {
//!     let config = SnapshotManagerConfig::new("orders-enrichment")
//!         .with_retain_count(30)
//!         .with_poll_interval(Duration::from_secs(30));
//!     config.validate()?;
//!
//!     let manager = SnapshotManager::new(
//!         config,
//!         Arc::new(FakeControlPlane::running("orders-enrichment", 1)),
//!         Arc::new(FakeAuditStore::default()),
//!         Arc::new(FakeNotificationSink::default()),
//!         Arc::new(SystemClock),
//!     );
//!
//!     let result = manager.run().await;
//!     println!("completed: {}", result.snapshot_completed);
//!     Ok(())
//! }
//! ```
//!
//! # Failure model
//!
//! Control-plane, audit, and notification failures never fail the run: they
//! are classified into typed outcomes, logged, and reflected in the run
//! result's flags. The invocation answer is always a 200 response carrying
//! the serialized [`RunReport`]; only response serialization can surface an
//! error to the host.

pub mod audit;
pub mod clock;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod manager;
pub mod notify;
pub mod probe;
pub mod snapshot;
pub mod testing;
pub mod types;

// Re-export main types for convenience
pub use audit::{AuditRecord, AuditRecorder, AuditStore};
pub use clock::{Clock, SystemClock};
pub use config::SnapshotManagerConfig;
pub use control_plane::{ControlPlane, SnapshotPage};
pub use error::{AuditError, ControlPlaneError, Error, NotifyError, Result};
pub use manager::SnapshotManager;
pub use notify::{MessageId, NotificationSink, Notifier, ALERT_SUBJECT};
pub use probe::{ProbeOutcome, StatusProber};
pub use snapshot::{
    CompletionPoller, InitiationOutcome, PollOutcome, PollState, PruneOutcome, RetentionPruner,
    SnapshotDirectory, SnapshotInitiator, MAX_POLL_ATTEMPTS,
};
pub use types::{
    snapshot_name_for_run, ApplicationDescriptor, ApplicationStatus, Response, RunId, RunReport,
    RunResult, SnapshotRecord, SnapshotStatus, VersionId, SNAPSHOT_NAME_PREFIX,
};
