//! Result collector: the single consumer of completion records.
//!
//! Workers send the identifier of each successfully transferred image over
//! a bounded channel. The collector appends them in arrival order and, once
//! the intake closes or the run is cancelled, commits the batch exactly once.

use gcrsync_changelog::{ChangelogBatch, Committer};
use gcrsync_core::ImageId;
use tokio::sync::mpsc;

use crate::cancel::CancelSignal;
use crate::error::Result;

/// Default intake capacity.
pub const DEFAULT_INTAKE_CAPACITY: usize = 20;

/// Outcome of a collector run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// The finalized batch, in arrival order.
    pub batch: ChangelogBatch,
    /// Whether the committer was invoked.
    pub committed: bool,
    /// Whether collection ended because the run was cancelled.
    pub interrupted: bool,
}

/// Owns the changelog batch for one run.
pub struct Collector {
    intake: mpsc::Receiver<ImageId>,
    signal: CancelSignal,
}

impl Collector {
    pub fn new(intake: mpsc::Receiver<ImageId>, signal: CancelSignal) -> Self {
        Self { intake, signal }
    }

    /// Create an intake channel together with its collector.
    ///
    /// Capacity zero is treated as one.
    pub fn channel(capacity: usize, signal: CancelSignal) -> (mpsc::Sender<ImageId>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx, signal))
    }

    /// Receive records until the intake closes or the run is cancelled.
    ///
    /// On cancellation the intake is closed so later sends fail fast, and
    /// records already buffered are still accepted.
    pub async fn collect(mut self) -> (ChangelogBatch, bool) {
        let mut batch = ChangelogBatch::new();
        let mut interrupted = false;

        loop {
            tokio::select! {
                biased;
                record = self.intake.recv() => match record {
                    Some(image) => batch.push(image),
                    None => break,
                },
                _ = self.signal.cancelled() => {
                    interrupted = true;
                    self.intake.close();
                    while let Some(image) = self.intake.recv().await {
                        batch.push(image);
                    }
                    break;
                }
            }
        }

        (batch, interrupted)
    }

    /// Collect, then commit the batch if it is non-empty.
    pub async fn run<C>(self, committer: &C) -> Result<CollectReport>
    where
        C: Committer + ?Sized,
    {
        let (batch, interrupted) = self.collect().await;

        if batch.is_empty() {
            tracing::info!(interrupted, "no images transferred, skipping changelog commit");
            return Ok(CollectReport {
                batch,
                committed: false,
                interrupted,
            });
        }

        tracing::info!(images = batch.len(), interrupted, "committing changelog");
        committer.commit(&batch).await?;

        Ok(CollectReport {
            batch,
            committed: true,
            interrupted,
        })
    }
}
