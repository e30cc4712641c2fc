//! # gcrsync core
//!
//! Pure primitives for gcrsync: image identifiers, image sets, and the
//! differ that computes which images still need mirroring.
//!
//! This crate contains no I/O and no async code.
//!
//! ## Key Types
//!
//! - [`ImageId`] - Opaque identifier of one image within a namespace
//! - [`ImageSet`] - The images a namespace held at one point in time
//! - [`SyncPlan`] - Images present in the source but absent from the target
//!
//! ## Usage
//!
//! ```rust
//! use gcrsync_core::{diff, ImageSet};
//!
//! let source: ImageSet = ["pause:3.1", "etcd:3.2.24"].into_iter().collect();
//! let target: ImageSet = ["pause:3.1"].into_iter().collect();
//!
//! let plan = diff(&source, &target);
//! assert_eq!(plan.len(), 1);
//! ```

pub mod error;
pub mod inventory;
pub mod types;

pub use error::{CoreError, Result};
pub use inventory::{diff, ImageSet, Inventory, SyncPlan};
pub use types::{ImageId, ImageRef};
