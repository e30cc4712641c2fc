//! Committer trait and implementations.
//!
//! A committer records one changelog batch per sync run. It is invoked at
//! most once per run and only for non-empty batches.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::io::AsyncWriteExt;

use crate::batch::{changelog_file_name, render_markdown, ChangelogBatch};
use crate::error::{ChangelogError, Result};

/// Records a changelog batch in durable storage.
///
/// Failure does not undo any transfer; the images stay mirrored but are
/// missing from the changelog for that run.
#[async_trait]
pub trait Committer: Send + Sync {
    async fn commit(&self, batch: &ChangelogBatch) -> Result<()>;
}

#[async_trait]
impl<T: Committer + ?Sized> Committer for Arc<T> {
    async fn commit(&self, batch: &ChangelogBatch) -> Result<()> {
        (**self).commit(batch).await
    }
}

/// Keeps every committed batch in memory.
#[derive(Default)]
pub struct MemoryCommitter {
    commits: Mutex<Vec<ChangelogBatch>>,
    reject: Option<String>,
}

impl MemoryCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A committer that rejects every batch with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            commits: Mutex::new(Vec::new()),
            reject: Some(reason.into()),
        }
    }

    /// Batches committed so far, oldest first.
    pub fn commits(&self) -> Vec<ChangelogBatch> {
        self.commits.lock().unwrap().clone()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().unwrap().len()
    }
}

#[async_trait]
impl Committer for MemoryCommitter {
    async fn commit(&self, batch: &ChangelogBatch) -> Result<()> {
        if let Some(reason) = &self.reject {
            return Err(ChangelogError::Rejected(reason.clone()));
        }
        self.commits.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

/// Appends each batch to a dated markdown file in a working directory.
///
/// The directory is expected to be a checkout of the changelog repository;
/// pushing it is left to the caller.
pub struct FileCommitter {
    dir: PathBuf,
    prefix: String,
    date: Option<NaiveDate>,
}

impl FileCommitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: String::new(),
            date: None,
        }
    }

    /// Qualify every entry, e.g. with `gcr.io/google_containers`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Pin the changelog date instead of using today's local date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file the next commit will append to.
    pub fn current_path(&self) -> PathBuf {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        self.dir.join(changelog_file_name(date))
    }
}

#[async_trait]
impl Committer for FileCommitter {
    async fn commit(&self, batch: &ChangelogBatch) -> Result<()> {
        let path = self.current_path();
        let heading = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let section = render_markdown(&heading, &self.prefix, batch);

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(section.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(path = %path.display(), images = batch.len(), "changelog written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcrsync_core::ImageId;

    fn batch(items: &[&str]) -> ChangelogBatch {
        items.iter().map(|s| ImageId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_memory_committer_records() {
        let committer = MemoryCommitter::new();
        committer.commit(&batch(&["pause:3.1"])).await.unwrap();

        assert_eq!(committer.commit_count(), 1);
        assert_eq!(committer.commits()[0].as_slice(), &[ImageId::from("pause:3.1")]);
    }

    #[tokio::test]
    async fn test_memory_committer_rejects() {
        let committer = MemoryCommitter::rejecting("remote hung up");
        let err = committer.commit(&batch(&["pause:3.1"])).await.unwrap_err();

        assert!(matches!(err, ChangelogError::Rejected(_)));
        assert_eq!(committer.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_file_committer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2018, 12, 7).unwrap();
        let committer = FileCommitter::new(dir.path())
            .with_prefix("gcr.io/google_containers")
            .with_date(date);

        committer.commit(&batch(&["pause:3.1"])).await.unwrap();
        committer.commit(&batch(&["etcd:3.2", "coredns:1.2"])).await.unwrap();

        let path = dir.path().join("CHANGELOG-2018-12-07.md");
        assert_eq!(committer.current_path(), path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("### ").count(), 2);
        let pause = content.find("gcr.io/google_containers/pause:3.1").unwrap();
        let etcd = content.find("gcr.io/google_containers/etcd:3.2").unwrap();
        let coredns = content.find("gcr.io/google_containers/coredns:1.2").unwrap();
        assert!(pause < etcd && etcd < coredns);
    }
}
