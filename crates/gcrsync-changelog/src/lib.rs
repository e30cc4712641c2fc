//! # gcrsync changelog
//!
//! The changelog records which images each sync run mirrored.
//!
//! ## Key Types
//!
//! - [`ChangelogBatch`] - Completion records of one run, in arrival order
//! - [`Committer`] - Async trait that persists a batch
//! - [`FileCommitter`] - Appends batches to `CHANGELOG-<date>.md`
//! - [`MemoryCommitter`] - Keeps batches in memory for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gcrsync_changelog::{ChangelogBatch, Committer, FileCommitter};
//! use gcrsync_core::ImageId;
//!
//! async fn example() {
//!     let committer = FileCommitter::new("changelog").with_prefix("gcr.io/google_containers");
//!
//!     let mut batch = ChangelogBatch::new();
//!     batch.push(ImageId::from("pause:3.1"));
//!     committer.commit(&batch).await.unwrap();
//! }
//! ```

pub mod batch;
pub mod committer;
pub mod error;

pub use batch::{changelog_file_name, render_markdown, ChangelogBatch};
pub use committer::{Committer, FileCommitter, MemoryCommitter};
pub use error::{ChangelogError, Result};
