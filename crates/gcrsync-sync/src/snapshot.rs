//! Paired listings of the source and target namespaces.

use gcrsync_core::{diff, ImageSet, Inventory, SyncPlan};
use gcrsync_registry::RegistryLister;

use crate::error::Result;

/// Where images come from and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub source: String,
    pub target: String,
}

impl Namespaces {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Source and target image sets taken together, with the plan derived from them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub source: ImageSet,
    pub target: ImageSet,
    pub plan: SyncPlan,
}

impl Snapshot {
    pub fn new(source: ImageSet, target: ImageSet) -> Self {
        let plan = diff(&source, &target);
        Self {
            source,
            target,
            plan,
        }
    }

    pub fn inventory(&self) -> Inventory {
        Inventory::new(&self.source, &self.target, &self.plan)
    }
}

/// List both namespaces concurrently. Either failure fails the snapshot.
pub async fn take_snapshot<S, T>(
    source: &S,
    target: &T,
    namespaces: &Namespaces,
) -> Result<Snapshot>
where
    S: RegistryLister + ?Sized,
    T: RegistryLister + ?Sized,
{
    let (source_images, target_images) = tokio::try_join!(
        source.list_images(&namespaces.source),
        target.list_images(&namespaces.target),
    )?;
    Ok(Snapshot::new(source_images, target_images))
}
