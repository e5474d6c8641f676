//! Error types for the snapshot control loop.
//!
//! Every external call is classified into one of the closed error sets
//! below at the component boundary; call sites branch on the variant, never
//! on message text. These kinds are converted into typed outcomes consumed
//! by the orchestrator and do not cross component boundaries as errors.
//! Only [`Error`] can surface to the invocation host.

use thiserror::Error;

/// Result type alias for snapshot manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that may surface to the invocation host.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// Response body serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by the application control plane.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneError {
    /// The target application does not exist.
    #[error("application not found: {0}")]
    NotFound(String),

    /// The request was rejected, e.g. a conflicting snapshot operation is
    /// already in progress.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other control-plane failure.
    #[error("control plane failure: {0}")]
    Transient(String),
}

impl ControlPlaneError {
    /// The diagnostic message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            ControlPlaneError::NotFound(msg)
            | ControlPlaneError::InvalidRequest(msg)
            | ControlPlaneError::Transient(msg) => msg,
        }
    }
}

/// Errors reported by the audit store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// The audit table does not exist.
    #[error("audit table not found: {0}")]
    TableNotFound(String),

    /// The write was not accepted.
    #[error("audit write rejected: {0}")]
    Rejected(String),
}

/// Errors reported by the notification channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The notification channel does not exist.
    #[error("notification channel not found: {0}")]
    ChannelNotFound(String),

    /// The message could not be published.
    #[error("publish failed: {0}")]
    PublishFailed(String),
}
