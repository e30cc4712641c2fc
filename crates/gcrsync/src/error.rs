//! Error types for gcrsync.

use gcrsync_sync::SyncError;
use thiserror::Error;

/// Errors that can occur while configuring or running gcrsync.
#[derive(Debug, Error)]
pub enum GcrsyncError {
    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A sync run failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The global subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}

/// Result type for gcrsync operations.
pub type Result<T> = std::result::Result<T, GcrsyncError>;
