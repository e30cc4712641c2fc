//! Registry traits: the seams between the sync engine and real registries.
//!
//! The engine only ever lists namespaces and transfers single images.
//! HTTP clients, proxies and docker daemons live behind these traits.

use std::sync::Arc;

use async_trait::async_trait;
use gcrsync_core::{ImageId, ImageSet};

use crate::error::Result;

/// Lists every image of a registry namespace.
#[async_trait]
pub trait RegistryLister: Send + Sync {
    /// Snapshot the images currently held by `namespace`.
    ///
    /// Any failure is fatal to the caller's current cycle; partial
    /// results are never returned.
    async fn list_images(&self, namespace: &str) -> Result<ImageSet>;
}

/// Two-level registry catalog: repositories, then tags per repository.
///
/// Registries such as `gcr.io` and Docker Hub expose their listings this
/// way. Wrap a catalog in [`CatalogLister`](crate::CatalogLister) to get a
/// [`RegistryLister`].
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Repositories under a namespace.
    async fn repositories(&self, namespace: &str) -> Result<Vec<String>>;

    /// Tags of one repository.
    ///
    /// An empty string stands for the repository's untagged reference.
    async fn tags(&self, namespace: &str, repository: &str) -> Result<Vec<String>>;
}

/// Copies one image from the source namespace to the target namespace.
///
/// Pull, retag and push are the implementation's concern, as is any
/// internal retry policy. The engine calls this once per planned image.
#[async_trait]
pub trait ImageTransfer: Send + Sync {
    async fn transfer(&self, image: &ImageId) -> Result<()>;
}

#[async_trait]
impl<T: RegistryLister + ?Sized> RegistryLister for Arc<T> {
    async fn list_images(&self, namespace: &str) -> Result<ImageSet> {
        (**self).list_images(namespace).await
    }
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn repositories(&self, namespace: &str) -> Result<Vec<String>> {
        (**self).repositories(namespace).await
    }

    async fn tags(&self, namespace: &str, repository: &str) -> Result<Vec<String>> {
        (**self).tags(namespace, repository).await
    }
}

#[async_trait]
impl<T: ImageTransfer + ?Sized> ImageTransfer for Arc<T> {
    async fn transfer(&self, image: &ImageId) -> Result<()> {
        (**self).transfer(image).await
    }
}
