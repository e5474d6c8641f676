//! Wall-clock and sleep abstraction.
//!
//! The completion poller deliberately suspends between attempts, and the
//! run identifier is a millisecond wall-clock capture. Routing both through
//! a trait lets tests simulate elapsed time without real delay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source injected into the control loop.
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// System clock backed by `SystemTime` and tokio's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
