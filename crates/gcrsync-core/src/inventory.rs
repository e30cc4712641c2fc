//! Image inventories and the differ that turns two of them into a sync plan.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::ImageId;

/// The images one registry namespace held at one point in time.
///
/// Duplicates collapse on insert; iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    images: HashSet<ImageId>,
}

impl ImageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an image. Returns false if it was already present.
    pub fn insert(&mut self, image: ImageId) -> bool {
        self.images.insert(image)
    }

    pub fn contains(&self, image: &ImageId) -> bool {
        self.images.contains(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageId> {
        self.images.iter()
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: ImageSet) {
        self.images.extend(other.images);
    }
}

impl<I: Into<ImageId>> FromIterator<I> for ImageSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            images: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for ImageSet {
    type Item = ImageId;
    type IntoIter = std::collections::hash_set::IntoIter<ImageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

/// The images that must be transferred in one run.
///
/// Computed once and never modified afterward. Entries are sorted so
/// tasks launch in a reproducible order; completion order is still
/// whatever the transfers produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    images: Vec<ImageId>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageId> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[ImageId] {
        &self.images
    }

    pub fn contains(&self, image: &ImageId) -> bool {
        self.images.binary_search(image).is_ok()
    }
}

impl<'a> IntoIterator for &'a SyncPlan {
    type Item = &'a ImageId;
    type IntoIter = std::slice::Iter<'a, ImageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

/// Compute every image present in `source` but absent from `target`.
///
/// Pure and infallible; empty inputs produce an empty plan.
pub fn diff(source: &ImageSet, target: &ImageSet) -> SyncPlan {
    let mut images: Vec<ImageId> = source
        .iter()
        .filter(|image| !target.contains(image))
        .cloned()
        .collect();
    images.sort();
    SyncPlan { images }
}

/// Sizes of one source/target comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub source: usize,
    pub target: usize,
    pub pending: usize,
}

impl Inventory {
    pub fn new(source: &ImageSet, target: &ImageSet, plan: &SyncPlan) -> Self {
        Self {
            source: source.len(),
            target: target.len(),
            pending: plan.len(),
        }
    }
}
