//! Bounded fan-out over a two-level registry catalog.

use std::sync::Arc;

use async_trait::async_trait;
use gcrsync_core::{ImageId, ImageSet};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::Result;
use crate::traits::{Catalog, RegistryLister};

/// A [`RegistryLister`] that queries tags for every repository concurrently.
///
/// At most `query_limit` tag queries are in flight at once. The first
/// failing query fails the whole listing and aborts the rest.
pub struct CatalogLister<C: Catalog + 'static> {
    catalog: Arc<C>,
    query_limit: usize,
}

impl<C: Catalog + 'static> CatalogLister<C> {
    /// Wrap a catalog. A `query_limit` of zero is treated as one.
    pub fn new(catalog: C, query_limit: usize) -> Self {
        Self::from_arc(Arc::new(catalog), query_limit)
    }

    /// Wrap a shared catalog.
    pub fn from_arc(catalog: Arc<C>, query_limit: usize) -> Self {
        Self {
            catalog,
            query_limit: query_limit.max(1),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn query_limit(&self) -> usize {
        self.query_limit
    }
}

#[async_trait]
impl<C: Catalog + 'static> RegistryLister for CatalogLister<C> {
    async fn list_images(&self, namespace: &str) -> Result<ImageSet> {
        let repositories = self.catalog.repositories(namespace).await?;
        tracing::debug!(
            namespace,
            repositories = repositories.len(),
            "querying tags"
        );

        let limit = Arc::new(Semaphore::new(self.query_limit));
        let mut queries = JoinSet::new();

        for repository in repositories {
            let catalog = Arc::clone(&self.catalog);
            let limit = Arc::clone(&limit);
            let namespace = namespace.to_string();

            queries.spawn(async move {
                // The semaphore is never closed while queries are running.
                let _permit = limit.acquire_owned().await;
                let tags = catalog.tags(&namespace, &repository).await?;
                Ok::<_, crate::RegistryError>(
                    tags.into_iter()
                        .map(|tag| ImageId::from_parts(&repository, &tag))
                        .collect::<Vec<_>>(),
                )
            });
        }

        let mut images = ImageSet::new();
        while let Some(joined) = queries.join_next().await {
            for image in joined?? {
                images.insert(image);
            }
        }

        Ok(images)
    }
}
