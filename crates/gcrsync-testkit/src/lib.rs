//! # gcrsync testkit
//!
//! Testing utilities for gcrsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: In-memory source and target registries plus a scripted
//!   transfer executor with per-image delays, failures and a concurrency probe
//! - **Generators**: Proptest strategies for image identifiers, image sets
//!   and simulated runs
//!
//! ## Test Fixtures
//!
//! ```rust
//! use std::time::Duration;
//! use gcrsync_testkit::fixtures::MirrorFixture;
//!
//! let fixture = MirrorFixture::new(&["pause:3.1", "etcd:3.2"], &["pause:3.1"]);
//! let transfer = fixture.transfer(Duration::from_millis(50)).fail("etcd:3.2");
//! assert_eq!(transfer.peak(), 0);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use gcrsync_testkit::generators::overlapping_sets;
//!
//! proptest! {
//!     #[test]
//!     fn plan_never_contains_target((source, target) in overlapping_sets(50)) {
//!         let plan = gcrsync_core::diff(&source, &target);
//!         prop_assert!(plan.iter().all(|image| !target.contains(image)));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{image_names, MirrorFixture, ScriptedTransfer};
pub use generators::{image_id, image_set, overlapping_sets, RunParams};
