//! In-memory registry and transfer implementations.
//!
//! These are primarily for testing. They follow the same contracts as a
//! real registry but keep every namespace in a map with no persistence.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use gcrsync_core::{ImageId, ImageSet};

use crate::error::{RegistryError, Result};
use crate::traits::{Catalog, ImageTransfer, RegistryLister};

/// In-memory registry holding any number of namespaces.
///
/// Thread-safe via RwLock. Listing an unknown namespace fails with
/// [`RegistryError::NamespaceNotFound`].
#[derive(Default)]
pub struct MemoryRegistry {
    namespaces: RwLock<HashMap<String, ImageSet>>,
}

impl MemoryRegistry {
    /// Create a registry with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with one namespace holding `images`.
    pub fn with_images<I, T>(namespace: &str, images: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ImageId>,
    {
        let registry = Self::new();
        registry.create_namespace(namespace);
        for image in images {
            registry.insert(namespace, image.into());
        }
        registry
    }

    /// Create an empty namespace if it does not exist yet.
    pub fn create_namespace(&self, namespace: &str) {
        let mut namespaces = self.namespaces.write().unwrap();
        namespaces.entry(namespace.to_string()).or_default();
    }

    /// Add an image, creating the namespace on demand.
    ///
    /// Returns false if the image was already present.
    pub fn insert(&self, namespace: &str, image: ImageId) -> bool {
        let mut namespaces = self.namespaces.write().unwrap();
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(image)
    }

    pub fn contains(&self, namespace: &str, image: &ImageId) -> bool {
        let namespaces = self.namespaces.read().unwrap();
        namespaces
            .get(namespace)
            .map(|set| set.contains(image))
            .unwrap_or(false)
    }

    /// Snapshot of a namespace, or `None` if it does not exist.
    pub fn images(&self, namespace: &str) -> Option<ImageSet> {
        let namespaces = self.namespaces.read().unwrap();
        namespaces.get(namespace).cloned()
    }

    fn snapshot(&self, namespace: &str) -> Result<ImageSet> {
        self.images(namespace)
            .ok_or_else(|| RegistryError::NamespaceNotFound(namespace.to_string()))
    }
}

#[async_trait]
impl RegistryLister for MemoryRegistry {
    async fn list_images(&self, namespace: &str) -> Result<ImageSet> {
        self.snapshot(namespace)
    }
}

#[async_trait]
impl Catalog for MemoryRegistry {
    async fn repositories(&self, namespace: &str) -> Result<Vec<String>> {
        let images = self.snapshot(namespace)?;
        let repositories: BTreeSet<String> = images
            .iter()
            .map(|image| image.reference().repository.to_string())
            .collect();
        Ok(repositories.into_iter().collect())
    }

    async fn tags(&self, namespace: &str, repository: &str) -> Result<Vec<String>> {
        let images = self.snapshot(namespace)?;
        let mut tags: Vec<String> = images
            .iter()
            .filter_map(|image| {
                let r = image.reference();
                (r.repository == repository).then(|| r.tag.unwrap_or_default().to_string())
            })
            .collect();
        tags.sort();
        Ok(tags)
    }
}

/// Copies images between two in-memory namespaces.
///
/// Specific images can be marked as failing to exercise the engine's
/// per-image failure path.
pub struct MemoryTransfer {
    source: Arc<MemoryRegistry>,
    source_namespace: String,
    target: Arc<MemoryRegistry>,
    target_namespace: String,
    failing: RwLock<HashSet<ImageId>>,
}

impl MemoryTransfer {
    pub fn new(
        source: Arc<MemoryRegistry>,
        source_namespace: impl Into<String>,
        target: Arc<MemoryRegistry>,
        target_namespace: impl Into<String>,
    ) -> Self {
        Self {
            source,
            source_namespace: source_namespace.into(),
            target,
            target_namespace: target_namespace.into(),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Make every future transfer of `image` fail.
    pub fn fail_on(&self, image: impl Into<ImageId>) {
        self.failing.write().unwrap().insert(image.into());
    }
}

#[async_trait]
impl ImageTransfer for MemoryTransfer {
    async fn transfer(&self, image: &ImageId) -> Result<()> {
        if !self.source.contains(&self.source_namespace, image) {
            return Err(RegistryError::ImageNotFound(image.clone()));
        }
        if self.failing.read().unwrap().contains(image) {
            return Err(RegistryError::Transfer {
                image: image.clone(),
                message: "push rejected".into(),
            });
        }
        self.target.insert(&self.target_namespace, image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLister;

    #[tokio::test]
    async fn test_memory_registry_listing() {
        let registry = MemoryRegistry::with_images("gcr", ["pause:3.1", "pause:3.1", "etcd:3.2"]);

        let images = registry.list_images("gcr").await.unwrap();
        assert_eq!(images.len(), 2);

        let err = registry.list_images("missing").await.unwrap_err();
        assert!(matches!(err, RegistryError::NamespaceNotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_registry_catalog() {
        let registry =
            MemoryRegistry::with_images("gcr", ["pause:3.1", "pause:3.0", "etcd:3.2", "coredns"]);

        let repos = registry.repositories("gcr").await.unwrap();
        assert_eq!(repos, vec!["coredns", "etcd", "pause"]);

        let tags = registry.tags("gcr", "pause").await.unwrap();
        assert_eq!(tags, vec!["3.0", "3.1"]);

        let tags = registry.tags("gcr", "coredns").await.unwrap();
        assert_eq!(tags, vec![""]);
    }

    #[tokio::test]
    async fn test_catalog_view_matches_direct_listing() {
        let registry = Arc::new(MemoryRegistry::with_images(
            "gcr",
            ["coredns", "coredns:1.2", "pause:3.1"],
        ));
        let lister = CatalogLister::from_arc(Arc::clone(&registry), 4);

        let direct = registry.list_images("gcr").await.unwrap();
        let catalog = lister.list_images("gcr").await.unwrap();

        let mut direct: Vec<_> = direct.into_iter().collect();
        let mut catalog: Vec<_> = catalog.into_iter().collect();
        direct.sort();
        catalog.sort();
        assert_eq!(catalog, direct);
        assert!(catalog.contains(&ImageId::from("coredns")));
    }

    #[tokio::test]
    async fn test_memory_transfer_copies_image() {
        let source = Arc::new(MemoryRegistry::with_images("gcr", ["pause:3.1", "etcd:3.2"]));
        let target = Arc::new(MemoryRegistry::with_images("hub", Vec::<ImageId>::new()));
        let transfer = MemoryTransfer::new(source, "gcr", Arc::clone(&target), "hub");
        transfer.fail_on("etcd:3.2");

        transfer.transfer(&ImageId::from("pause:3.1")).await.unwrap();
        assert!(target.contains("hub", &ImageId::from("pause:3.1")));

        let err = transfer.transfer(&ImageId::from("etcd:3.2")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Transfer { .. }));
        assert!(!target.contains("hub", &ImageId::from("etcd:3.2")));

        let err = transfer.transfer(&ImageId::from("nope:1")).await.unwrap_err();
        assert!(matches!(err, RegistryError::ImageNotFound(_)));
    }
}
