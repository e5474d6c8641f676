//! Configuration for the snapshot manager.

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

/// Environment variable names recognized by
/// [`SnapshotManagerConfig::from_env`].
pub mod env_keys {
    /// Name of the monitored application.
    pub const APP_NAME: &str = "SNAPMAN_APP_NAME";
    /// Identifier of the audit table.
    pub const AUDIT_TABLE: &str = "SNAPMAN_AUDIT_TABLE";
    /// Attribute name of the audit table's partition key.
    pub const AUDIT_PARTITION_KEY: &str = "SNAPMAN_AUDIT_PARTITION_KEY";
    /// Attribute name of the audit table's sort key.
    pub const AUDIT_SORT_KEY: &str = "SNAPMAN_AUDIT_SORT_KEY";
    /// Identifier of the operator notification channel.
    pub const NOTIFICATION_CHANNEL: &str = "SNAPMAN_NOTIFICATION_CHANNEL";
    /// Number of most-recent snapshots to keep.
    pub const SNAPSHOTS_TO_RETAIN: &str = "SNAPMAN_SNAPSHOTS_TO_RETAIN";
    /// Seconds to sleep between completion poll attempts.
    pub const POLL_INTERVAL_SECONDS: &str = "SNAPMAN_POLL_INTERVAL_SECONDS";
}

/// Configuration for one snapshot manager deployment. Constant per
/// deployment; one instance serves every invocation.
#[derive(Debug, Clone)]
pub struct SnapshotManagerConfig {
    /// Name of the monitored application.
    pub app_name: String,

    /// Identifier of the audit table.
    pub audit_table: String,

    /// Attribute name of the audit table's partition key.
    pub partition_key_name: String,

    /// Attribute name of the audit table's sort key.
    pub sort_key_name: String,

    /// Identifier of the operator notification channel.
    pub notification_channel: String,

    /// Number of most-recent snapshots (by creation time) to keep. All
    /// others are excess.
    pub retain_count: usize,

    /// Fixed delay between completion poll attempts. The whole invocation
    /// can block for up to four times this value plus network latency, so
    /// it must stay comfortably under the host's own timeout.
    pub poll_interval: Duration,
}

impl Default for SnapshotManagerConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            audit_table: "snapshot-manager-audit".to_string(),
            partition_key_name: "app_name".to_string(),
            sort_key_name: "run_id".to_string(),
            notification_channel: "snapshot-manager-alerts".to_string(),
            retain_count: 30,
            poll_interval: Duration::from_secs(30),
        }
    }
}

impl SnapshotManagerConfig {
    /// Create a configuration for the given application.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Set the audit table identifier.
    pub fn with_audit_table(mut self, table: impl Into<String>) -> Self {
        self.audit_table = table.into();
        self
    }

    /// Set the audit table's key attribute names.
    pub fn with_audit_keys(
        mut self,
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
    ) -> Self {
        self.partition_key_name = partition_key.into();
        self.sort_key_name = sort_key.into();
        self
    }

    /// Set the notification channel identifier.
    pub fn with_notification_channel(mut self, channel: impl Into<String>) -> Self {
        self.notification_channel = channel.into();
        self
    }

    /// Set the number of snapshots to retain.
    pub fn with_retain_count(mut self, count: usize) -> Self {
        self.retain_count = count;
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Read the configuration from environment variables (see [`env_keys`]).
    pub fn from_env() -> Result<Self> {
        let config = Self {
            app_name: require(env_keys::APP_NAME)?,
            audit_table: require(env_keys::AUDIT_TABLE)?,
            partition_key_name: require(env_keys::AUDIT_PARTITION_KEY)?,
            sort_key_name: require(env_keys::AUDIT_SORT_KEY)?,
            notification_channel: require(env_keys::NOTIFICATION_CHANNEL)?,
            retain_count: parse(env_keys::SNAPSHOTS_TO_RETAIN)?,
            poll_interval: Duration::from_secs(parse(env_keys::POLL_INTERVAL_SECONDS)?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration's invariants.
    pub fn validate(&self) -> Result<()> {
        if self.app_name.is_empty() {
            return Err(Error::Config("application name must not be empty".to_string()));
        }
        if self.audit_table.is_empty() {
            return Err(Error::Config("audit table must not be empty".to_string()));
        }
        if self.partition_key_name.is_empty() || self.sort_key_name.is_empty() {
            return Err(Error::Config(
                "audit key attribute names must not be empty".to_string(),
            ));
        }
        if self.notification_channel.is_empty() {
            return Err(Error::Config(
                "notification channel must not be empty".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }
        Ok(())
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| Error::Config(format!("missing environment variable {key}")))
}

fn parse<T>(key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    require(key)?
        .parse()
        .map_err(|e| Error::Config(format!("invalid value for {key}: {e}")))
}
