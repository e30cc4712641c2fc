//! # gcrsync registry
//!
//! Registry seams for gcrsync. The sync engine never talks HTTP or to a
//! docker daemon directly; it goes through the traits defined here.
//!
//! ## Key Types
//!
//! - [`RegistryLister`] - Snapshot the images of a namespace
//! - [`Catalog`] - Two-level repository/tag listing, as registries expose it
//! - [`CatalogLister`] - Turns a [`Catalog`] into a [`RegistryLister`] with
//!   bounded concurrent tag queries
//! - [`ImageTransfer`] - Copy one image from source to target
//! - [`MemoryRegistry`] / [`MemoryTransfer`] - In-memory implementations
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use gcrsync_registry::{CatalogLister, MemoryRegistry, RegistryLister};
//!
//! async fn example() {
//!     let registry = Arc::new(MemoryRegistry::with_images("google_containers", ["pause:3.1"]));
//!     let lister = CatalogLister::from_arc(registry, 20);
//!     let images = lister.list_images("google_containers").await.unwrap();
//!     assert_eq!(images.len(), 1);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod memory;
pub mod traits;

pub use catalog::CatalogLister;
pub use error::{RegistryError, Result};
pub use memory::{MemoryRegistry, MemoryTransfer};
pub use traits::{Catalog, ImageTransfer, RegistryLister};
