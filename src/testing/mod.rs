//! Test doubles for the snapshot manager's collaborators.
//!
//! The control loop reaches every external service through a trait, so the
//! whole loop can be driven without a control plane, audit store,
//! notification channel, or real time:
//!
//! - [`FakeControlPlane`]: scripted application descriptor, snapshot
//!   directory, and failure injection per operation.
//! - [`FakeAuditStore`]: records written audit rows.
//! - [`FakeNotificationSink`]: records published alerts.
//! - [`ManualClock`]: time advances only when the loop sleeps; sleeps are
//!   recorded instead of elapsing.
//!
//! These are exported so downstream users can test their own wiring against
//! the same traits.

mod fakes;

mod run_scenarios;

pub use fakes::{FakeAuditStore, FakeControlPlane, FakeNotificationSink, ManualClock};
