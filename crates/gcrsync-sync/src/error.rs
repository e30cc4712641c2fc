//! Error types for the sync engine.

use thiserror::Error;

use gcrsync_changelog::ChangelogError;
use gcrsync_registry::RegistryError;

/// Errors that abort a sync run.
///
/// Per-image transfer failures and deadline expiry are not errors; they
/// are absorbed by the engine and surfaced in the run report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing the source or target namespace failed.
    #[error("listing failed: {0}")]
    Listing(#[from] RegistryError),

    /// The changelog commit failed. Transferred images stay transferred.
    #[error("changelog commit failed: {0}")]
    Commit(#[from] ChangelogError),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
