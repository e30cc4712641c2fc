//! Error types for registry operations.

use thiserror::Error;

use gcrsync_core::ImageId;

/// Errors that can occur while talking to a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Listing a namespace failed.
    #[error("listing {namespace} failed: {message}")]
    Listing { namespace: String, message: String },

    /// Listing tags for one repository failed.
    #[error("listing tags of {namespace}/{repository} failed: {message}")]
    Tags {
        namespace: String,
        repository: String,
        message: String,
    },

    /// Namespace does not exist in the registry.
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Transferring one image failed.
    #[error("transfer of {image} failed: {message}")]
    Transfer { image: ImageId, message: String },

    /// Image does not exist in the source registry.
    #[error("image not found: {0}")]
    ImageNotFound(ImageId),

    /// A query task panicked or was aborted.
    #[error("query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
