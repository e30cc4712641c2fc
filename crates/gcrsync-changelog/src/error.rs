//! Error types for the changelog module.

use thiserror::Error;

/// Errors that can occur while committing a changelog batch.
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Writing the changelog file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing repository refused the commit.
    #[error("commit rejected: {0}")]
    Rejected(String),
}

/// Result type for changelog operations.
pub type Result<T> = std::result::Result<T, ChangelogError>;
