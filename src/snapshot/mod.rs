//! Snapshot lifecycle stages.
//!
//! The four stages of the control loop's snapshot handling:
//!
//! - [`SnapshotInitiator`] requests creation of a new snapshot.
//! - [`SnapshotDirectory`] lists existing snapshots for a version, used both
//!   for completion detection and retention accounting.
//! - [`CompletionPoller`] waits, with a bounded fixed-interval retry loop,
//!   for a newly initiated snapshot to become ready.
//! - [`RetentionPruner`] deletes the oldest snapshots beyond the retention
//!   count.

mod directory;
mod initiate;
mod poll;
mod prune;

pub use directory::SnapshotDirectory;
pub use initiate::{InitiationOutcome, SnapshotInitiator};
pub use poll::{CompletionPoller, PollOutcome, PollState, MAX_POLL_ATTEMPTS};
pub use prune::{PruneOutcome, RetentionPruner};
