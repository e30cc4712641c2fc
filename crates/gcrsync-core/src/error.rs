//! Error types for gcrsync core.

use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("image identifier is empty")]
    EmptyImageId,

    #[error("invalid image identifier: {0:?}")]
    InvalidImageId(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
