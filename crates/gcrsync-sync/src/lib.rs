//! # gcrsync sync
//!
//! Bounded-concurrency engine that mirrors images missing from the target
//! namespace and records them in a single changelog commit.
//!
//! ## Overview
//!
//! A run lists both namespaces, diffs them into a [`SyncPlan`], and spawns
//! one task per planned image. Tasks race an admission token from the
//! [`WorkerPool`] against the run's [`CancelSignal`]; at most `P` transfer
//! at once. Successful transfers send their identifier to the
//! [`Collector`], which commits the whole batch once at the end.
//!
//! ## Key Properties
//!
//! - **Bounded**: never more than `P` tokens held, all `P` returned at run end
//! - **Cancellable**: the [`Deadline`] stops admission and finalizes the
//!   collector; in-flight transfers are never interrupted
//! - **Single commit**: at most one commit per run, none for an empty batch
//! - **Isolated**: pool, channel and signal are created per run
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gcrsync_changelog::MemoryCommitter;
//! use gcrsync_registry::{MemoryRegistry, MemoryTransfer};
//! use gcrsync_sync::{EngineConfig, Namespaces, SyncEngine};
//!
//! async fn example() {
//!     let source = Arc::new(MemoryRegistry::with_images("google_containers", ["pause:3.1"]));
//!     let target = Arc::new(MemoryRegistry::with_images("gcrxio", Vec::<&str>::new()));
//!     let transfer = Arc::new(MemoryTransfer::new(
//!         source.clone(), "google_containers", target.clone(), "gcrxio",
//!     ));
//!     let committer = MemoryCommitter::new();
//!
//!     let engine = SyncEngine::new(EngineConfig::default());
//!     let report = engine
//!         .run(&*source, &*target, &Namespaces::new("google_containers", "gcrxio"), transfer, &committer)
//!         .await
//!         .unwrap();
//!     println!("mirrored {} images", report.recorded);
//! }
//! ```
//!
//! ## Ordering
//!
//! The committed batch is in completion order, not plan order.

pub mod cancel;
pub mod collector;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod pool;
pub mod snapshot;

pub use cancel::{CancelSignal, Deadline};
pub use collector::{CollectReport, Collector, DEFAULT_INTAKE_CAPACITY};
pub use engine::{EngineConfig, SyncEngine, SyncReport};
pub use error::{Result, SyncError};
pub use monitor::{Monitor, MonitorMode, MonitorReport, DEFAULT_MONITOR_INTERVAL};
pub use pool::{PoolReport, TaskOutcome, WorkerPool};
pub use snapshot::{take_snapshot, Namespaces, Snapshot};

pub use gcrsync_core::SyncPlan;
