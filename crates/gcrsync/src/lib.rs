//! # gcrsync
//!
//! Mirror container images that exist in one registry namespace but not in
//! another, and record every mirrored image in a changelog.
//!
//! ## Overview
//!
//! - **Sync**: list both namespaces, transfer the difference under a global
//!   concurrency cap and an optional deadline, commit one changelog batch
//! - **Monitor**: periodically re-list both namespaces and log the backlog
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gcrsync::{Syncer, SyncConfig};
//! use gcrsync::changelog::FileCommitter;
//! use gcrsync::registry::{MemoryRegistry, MemoryTransfer};
//!
//! async fn example() {
//!     let config = SyncConfig::from_json(r#"{"process_limit": 4, "sync_timeout": 3600}"#).unwrap();
//!     gcrsync::logging::init(config.debug).unwrap();
//!
//!     let source = Arc::new(MemoryRegistry::with_images("google_containers", ["pause:3.1"]));
//!     let target = Arc::new(MemoryRegistry::with_images("gcrxio", Vec::<&str>::new()));
//!     let transfer = Arc::new(MemoryTransfer::new(
//!         source.clone(), "google_containers", target.clone(), "gcrxio",
//!     ));
//!     let committer = FileCommitter::new("changelog").with_prefix("gcr.io/google_containers");
//!
//!     let syncer = Syncer::with_catalogs(config, source, target, transfer, committer).unwrap();
//!     let report = syncer.sync().await.unwrap();
//!     println!("mirrored {} images", report.recorded);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `gcrsync::core` - Image identifiers, sets and the differ
//! - `gcrsync::registry` - Listing and transfer traits
//! - `gcrsync::changelog` - Changelog batches and committers
//! - `gcrsync::sync` - The bounded-concurrency engine

pub mod config;
pub mod error;
pub mod logging;
pub mod syncer;

// Re-export component crates
pub use gcrsync_changelog as changelog;
pub use gcrsync_core as core;
pub use gcrsync_registry as registry;
pub use gcrsync_sync as sync;

// Re-export main types for convenience
pub use config::SyncConfig;
pub use error::{GcrsyncError, Result};
pub use syncer::Syncer;

pub use gcrsync_core::{diff, ImageId, ImageSet, Inventory, SyncPlan};
pub use gcrsync_sync::{CancelSignal, MonitorMode, MonitorReport, SyncReport};
