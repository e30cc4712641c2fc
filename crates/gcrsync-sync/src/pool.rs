//! Bounded worker pool.
//!
//! One task per planned image, at most `size` of them transferring at any
//! instant. Admission tokens are semaphore permits; a task holds one for
//! exactly the duration of its transfer.

use std::sync::Arc;

use gcrsync_core::{ImageId, SyncPlan};
use gcrsync_registry::ImageTransfer;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::cancel::CancelSignal;

/// Terminal state of one pool task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Transferred and handed to the collector.
    Recorded(ImageId),
    /// Transferred, but the collector had already closed its intake.
    Unrecorded(ImageId),
    /// The transfer failed.
    Failed(ImageId),
    /// The run was cancelled before the task was admitted.
    Skipped(ImageId),
}

/// Tally of a pool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub recorded: usize,
    pub skipped: usize,
    pub failed: Vec<ImageId>,
    pub unrecorded: Vec<ImageId>,
    /// Tasks that panicked. Their token was still returned.
    pub panicked: usize,
}

impl PoolReport {
    fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Recorded(_) => self.recorded += 1,
            TaskOutcome::Unrecorded(image) => self.unrecorded.push(image),
            TaskOutcome::Failed(image) => self.failed.push(image),
            TaskOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Images that reached the target, recorded or not.
    pub fn transferred(&self) -> usize {
        self.recorded + self.unrecorded.len()
    }

    /// Number of tasks that reached a terminal state.
    pub fn finished(&self) -> usize {
        self.transferred() + self.skipped + self.failed.len() + self.panicked
    }
}

/// Counting-semaphore pool of admission tokens.
#[derive(Debug)]
pub struct WorkerPool {
    tokens: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` tokens. Zero is treated as one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            tokens: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Tokens not currently held by a task.
    pub fn available(&self) -> usize {
        self.tokens.available_permits()
    }

    /// Run one task per plan entry and wait until every task is terminal.
    ///
    /// Each task gets its own clone of `records`; the caller's sender is
    /// left untouched, so the intake stays open until the caller drops it.
    pub async fn run<X>(
        &self,
        plan: &SyncPlan,
        transfer: Arc<X>,
        signal: &CancelSignal,
        records: &mpsc::Sender<ImageId>,
    ) -> PoolReport
    where
        X: ImageTransfer + ?Sized + 'static,
    {
        let mut tasks = JoinSet::new();

        for image in plan {
            tasks.spawn(run_task(
                image.clone(),
                Arc::clone(&self.tokens),
                Arc::clone(&transfer),
                signal.clone(),
                records.clone(),
            ));
        }

        let mut report = PoolReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    tracing::error!(error = %e, "transfer task panicked");
                    report.panicked += 1;
                }
            }
        }

        tracing::debug!(
            recorded = report.recorded,
            failed = report.failed.len(),
            skipped = report.skipped,
            unrecorded = report.unrecorded.len(),
            "worker pool drained"
        );
        report
    }
}

async fn run_task<X>(
    image: ImageId,
    tokens: Arc<Semaphore>,
    transfer: Arc<X>,
    signal: CancelSignal,
    records: mpsc::Sender<ImageId>,
) -> TaskOutcome
where
    X: ImageTransfer + ?Sized,
{
    // Cancellation wins ties so nothing is admitted after the deadline.
    let token = tokio::select! {
        biased;
        _ = signal.cancelled() => None,
        token = tokens.acquire_owned() => token.ok(),
    };
    let Some(token) = token else {
        tracing::debug!(%image, "skipped, run cancelled before admission");
        return TaskOutcome::Skipped(image);
    };

    tracing::debug!(%image, "transfer started");
    let result = transfer.transfer(&image).await;
    drop(token);

    match result {
        Ok(()) => match records.send(image.clone()).await {
            Ok(()) => {
                tracing::debug!(%image, "transfer recorded");
                TaskOutcome::Recorded(image)
            }
            Err(_) => {
                tracing::warn!(%image, "transferred after changelog intake closed, not recorded");
                TaskOutcome::Unrecorded(image)
            }
        },
        Err(e) => {
            tracing::warn!(%image, error = %e, "transfer failed");
            TaskOutcome::Failed(image)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gcrsync_core::{diff, ImageSet};
    use gcrsync_registry::{RegistryError, Result as RegistryResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Probe {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        fail: Option<ImageId>,
        panic_on: Option<ImageId>,
    }

    impl Probe {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                fail: None,
                panic_on: None,
            }
        }
    }

    #[async_trait]
    impl ImageTransfer for Probe {
        async fn transfer(&self, image: &ImageId) -> RegistryResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on.as_ref() == Some(image) {
                panic!("daemon exploded");
            }
            if self.fail.as_ref() == Some(image) {
                return Err(RegistryError::Transfer {
                    image: image.clone(),
                    message: "denied".into(),
                });
            }
            Ok(())
        }
    }

    fn plan(n: usize) -> SyncPlan {
        let source: ImageSet = (0..n).map(|i| format!("img{i}:v1")).collect();
        diff(&source, &ImageSet::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_never_exceeds_size() {
        let pool = WorkerPool::new(3);
        let probe = Arc::new(Probe::new(Duration::from_millis(50)));
        let (tx, mut rx) = mpsc::channel(64);

        let report = pool
            .run(&plan(10), Arc::clone(&probe), &CancelSignal::new(), &tx)
            .await;
        drop(tx);

        assert_eq!(report.recorded, 10);
        assert_eq!(report.finished(), 10);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(probe.peak.load(Ordering::SeqCst), 3);
        assert_eq!(pool.available(), 3);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_siblings() {
        let pool = WorkerPool::new(2);
        let mut probe = Probe::new(Duration::from_millis(5));
        probe.fail = Some(ImageId::from("img2:v1"));
        let (tx, _rx) = mpsc::channel(64);

        let report = pool.run(&plan(5), Arc::new(probe), &CancelSignal::new(), &tx).await;

        assert_eq!(report.recorded, 4);
        assert_eq!(report.failed, vec![ImageId::from("img2:v1")]);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_returns_token() {
        let pool = WorkerPool::new(1);
        let mut probe = Probe::new(Duration::from_millis(5));
        probe.panic_on = Some(ImageId::from("img0:v1"));
        let (tx, _rx) = mpsc::channel(64);

        let report = pool.run(&plan(3), Arc::new(probe), &CancelSignal::new(), &tx).await;

        assert_eq!(report.panicked, 1);
        assert_eq!(report.recorded, 2);
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_skips_everything() {
        let pool = WorkerPool::new(2);
        let probe = Arc::new(Probe::new(Duration::from_millis(5)));
        let signal = CancelSignal::new();
        signal.cancel();
        let (tx, _rx) = mpsc::channel(64);

        let report = pool.run(&plan(6), Arc::clone(&probe), &signal, &tx).await;

        assert_eq!(report.skipped, 6);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_skips_unadmitted() {
        let pool = WorkerPool::new(2);
        let probe = Arc::new(Probe::new(Duration::from_secs(10)));
        let signal = CancelSignal::new();
        let (tx, _rx) = mpsc::channel(64);

        let canceller = {
            let signal = signal.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(15)).await;
                signal.cancel();
            })
        };

        let report = pool.run(&plan(8), Arc::clone(&probe), &signal, &tx).await;
        canceller.await.unwrap();

        // Two admitted at t=0, two more at t=10; those finish at t=20.
        assert_eq!(probe.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.recorded, 4);
        assert_eq!(report.skipped, 4);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_intake_marks_unrecorded() {
        let pool = WorkerPool::new(2);
        let probe = Arc::new(Probe::new(Duration::from_millis(5)));
        let (tx, rx) = mpsc::channel(64);
        drop(rx);

        let report = pool.run(&plan(3), probe, &CancelSignal::new(), &tx).await;

        assert_eq!(report.recorded, 0);
        assert_eq!(report.unrecorded.len(), 3);
        assert_eq!(report.transferred(), 3);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.available(), 1);
    }
}
