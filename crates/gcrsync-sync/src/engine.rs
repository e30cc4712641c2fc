//! Sync engine: composes the differ, worker pool, deadline and collector
//! into one run.
//!
//! ```text
//! list source ─┐
//!              ├─ diff ─> plan ─> pool (P tokens) ──records──> collector ─> commit
//! list target ─┘                   ^                             ^
//!                                  └──── deadline cancel ────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use gcrsync_changelog::{ChangelogBatch, Committer};
use gcrsync_core::{ImageId, Inventory, SyncPlan};
use gcrsync_registry::{ImageTransfer, RegistryLister};

use crate::cancel::{CancelSignal, Deadline};
use crate::collector::{Collector, DEFAULT_INTAKE_CAPACITY};
use crate::error::Result;
use crate::pool::{PoolReport, WorkerPool};
use crate::snapshot::{take_snapshot, Namespaces};

/// Configuration for one engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrently running transfers.
    pub process_limit: usize,
    /// Overall run budget; zero means unbounded.
    pub deadline: Duration,
    /// Capacity of the completion record channel.
    pub intake_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            process_limit: 2,
            deadline: Duration::ZERO,
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
        }
    }
}

/// Result of a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Source, target and plan sizes.
    pub inventory: Inventory,
    /// Transfers handed to the changelog.
    pub recorded: usize,
    /// Transfers that failed.
    pub failed: Vec<ImageId>,
    /// Tasks skipped because the run was cancelled before admission.
    pub skipped: usize,
    /// Transfers that finished after the changelog intake had closed.
    pub unrecorded: Vec<ImageId>,
    /// Tasks that panicked.
    pub panicked: usize,
    /// The committed batch, if a commit happened.
    pub committed: Option<ChangelogBatch>,
    /// Whether the deadline fired during the run.
    pub deadline_exceeded: bool,
}

impl SyncReport {
    fn absorb(&mut self, pool: PoolReport) {
        self.recorded = pool.recorded;
        self.failed = pool.failed;
        self.skipped = pool.skipped;
        self.unrecorded = pool.unrecorded;
        self.panicked = pool.panicked;
    }

    /// Images that reached the target during this run.
    pub fn transferred(&self) -> usize {
        self.recorded + self.unrecorded.len()
    }
}

/// Runs sync passes. Every run gets its own token pool, channel and
/// cancellation signal, so runs never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    config: EngineConfig,
}

impl SyncEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// List both namespaces, compute the plan and execute it.
    ///
    /// Listing and commit failures are returned as errors. Transfer
    /// failures and deadline expiry are reported in the [`SyncReport`].
    pub async fn run<S, T, X, C>(
        &self,
        source: &S,
        target: &T,
        namespaces: &Namespaces,
        transfer: Arc<X>,
        committer: &C,
    ) -> Result<SyncReport>
    where
        S: RegistryLister + ?Sized,
        T: RegistryLister + ?Sized,
        X: ImageTransfer + ?Sized + 'static,
        C: Committer + ?Sized,
    {
        let snapshot = take_snapshot(source, target, namespaces).await?;
        let inventory = snapshot.inventory();

        tracing::info!("{} images total: {}", namespaces.source, inventory.source);
        tracing::info!("{} images total: {}", namespaces.target, inventory.target);
        tracing::info!("images waiting to be processed: {}", inventory.pending);

        let mut report = self.execute(&snapshot.plan, transfer, committer).await?;
        report.inventory = inventory;
        Ok(report)
    }

    /// Execute an already computed plan.
    pub async fn execute<X, C>(
        &self,
        plan: &SyncPlan,
        transfer: Arc<X>,
        committer: &C,
    ) -> Result<SyncReport>
    where
        X: ImageTransfer + ?Sized + 'static,
        C: Committer + ?Sized,
    {
        let signal = CancelSignal::new();
        let deadline = Deadline::start(self.config.deadline, &signal);
        let pool = WorkerPool::new(self.config.process_limit);
        let (records, collector) = Collector::channel(self.config.intake_capacity, signal.clone());

        let produce = async {
            let report = pool.run(plan, transfer, &signal, &records).await;
            // Every task is terminal; only now may the intake close.
            drop(records);
            report
        };

        let (pool_report, collected) = tokio::join!(produce, collector.run(committer));
        let deadline_exceeded = deadline.fired();
        drop(deadline);

        let mut report = SyncReport {
            deadline_exceeded,
            ..SyncReport::default()
        };
        report.absorb(pool_report);

        if !report.unrecorded.is_empty() {
            tracing::warn!(
                count = report.unrecorded.len(),
                "images transferred after the changelog was finalized"
            );
        }

        let collected = collected?;
        if collected.committed {
            report.committed = Some(collected.batch);
        }

        tracing::info!(
            recorded = report.recorded,
            failed = report.failed.len(),
            skipped = report.skipped,
            deadline_exceeded = report.deadline_exceeded,
            "sync run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use gcrsync_changelog::MemoryCommitter;
    use gcrsync_registry::{MemoryRegistry, MemoryTransfer};

    fn mirror(source: &[&str], target: &[&str]) -> (Arc<MemoryRegistry>, Arc<MemoryRegistry>) {
        (
            Arc::new(MemoryRegistry::with_images("gcr", source.iter().copied())),
            Arc::new(MemoryRegistry::with_images("hub", target.iter().copied())),
        )
    }

    #[tokio::test]
    async fn test_run_transfers_and_commits_once() {
        let (source, target) = mirror(&["a:1", "b:1", "c:1"], &["b:1"]);
        let transfer = Arc::new(MemoryTransfer::new(
            Arc::clone(&source),
            "gcr",
            Arc::clone(&target),
            "hub",
        ));
        let committer = MemoryCommitter::new();
        let engine = SyncEngine::new(EngineConfig {
            process_limit: 2,
            ..EngineConfig::default()
        });

        let report = engine
            .run(&*source, &*target, &Namespaces::new("gcr", "hub"), transfer, &committer)
            .await
            .unwrap();

        assert_eq!(report.inventory.pending, 2);
        assert_eq!(report.recorded, 2);
        assert!(!report.deadline_exceeded);

        let commits = committer.commits();
        assert_eq!(commits.len(), 1);
        let mut batch = commits[0].clone().into_vec();
        batch.sort();
        assert_eq!(batch, vec![ImageId::from("a:1"), ImageId::from("c:1")]);
        assert!(target.contains("hub", &ImageId::from("a:1")));
    }

    #[tokio::test]
    async fn test_empty_plan_never_commits() {
        let (source, target) = mirror(&["a:1"], &["a:1"]);
        let transfer = Arc::new(MemoryTransfer::new(
            Arc::clone(&source),
            "gcr",
            Arc::clone(&target),
            "hub",
        ));
        let committer = MemoryCommitter::new();

        let report = SyncEngine::default()
            .run(&*source, &*target, &Namespaces::new("gcr", "hub"), transfer, &committer)
            .await
            .unwrap();

        assert_eq!(report.inventory.pending, 0);
        assert!(report.committed.is_none());
        assert_eq!(committer.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let (source, _) = mirror(&["a:1"], &[]);
        let target = MemoryRegistry::new();
        let transfer = Arc::new(MemoryTransfer::new(
            Arc::clone(&source),
            "gcr",
            Arc::new(MemoryRegistry::new()),
            "hub",
        ));
        let committer = MemoryCommitter::new();

        let err = SyncEngine::default()
            .run(&*source, &target, &Namespaces::new("gcr", "hub"), transfer, &committer)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Listing(_)));
        assert_eq!(committer.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_transfers_are_not_recorded() {
        let (source, target) = mirror(&["a:1", "b:1", "c:1"], &[]);
        let transfer = Arc::new(MemoryTransfer::new(
            Arc::clone(&source),
            "gcr",
            Arc::clone(&target),
            "hub",
        ));
        transfer.fail_on("b:1");
        let committer = MemoryCommitter::new();

        let report = SyncEngine::default()
            .run(&*source, &*target, &Namespaces::new("gcr", "hub"), transfer, &committer)
            .await
            .unwrap();

        assert_eq!(report.failed, vec![ImageId::from("b:1")]);
        let batch = report.committed.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!batch.as_slice().contains(&ImageId::from("b:1")));
    }

    #[tokio::test]
    async fn test_commit_failure_propagates() {
        let (source, target) = mirror(&["a:1"], &[]);
        let transfer = Arc::new(MemoryTransfer::new(
            Arc::clone(&source),
            "gcr",
            Arc::clone(&target),
            "hub",
        ));
        let committer = MemoryCommitter::rejecting("push refused");

        let err = SyncEngine::default()
            .run(&*source, &*target, &Namespaces::new("gcr", "hub"), transfer, &committer)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Commit(_)));
        // The transfer itself is not rolled back.
        assert!(target.contains("hub", &ImageId::from("a:1")));
    }
}
