//! Run-scoped cancellation and the deadline that triggers it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One-shot cancellation signal shared by everything in a run.
///
/// Cloning yields a handle to the same signal. `cancel` is idempotent and
/// never blocks.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Further calls have no effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the signal fires. Returns immediately if it already has.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Wall-clock budget for a run.
///
/// When the budget elapses the deadline fires its [`CancelSignal`]. A zero
/// budget means unbounded: no timer is started and the signal is never
/// fired by the deadline. Dropping the deadline stops its timer.
///
/// Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct Deadline {
    budget: Duration,
    fired: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl Deadline {
    pub fn start(budget: Duration, signal: &CancelSignal) -> Self {
        let fired = Arc::new(AtomicBool::new(false));

        let timer = if budget.is_zero() {
            None
        } else {
            let signal = signal.clone();
            let fired = Arc::clone(&fired);
            Some(tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                fired.store(true, Ordering::SeqCst);
                tracing::warn!(budget_secs = budget.as_secs_f64(), "sync deadline exceeded");
                signal.cancel();
            }))
        };

        Self {
            budget,
            fired,
            timer,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn is_unbounded(&self) -> bool {
        self.timer.is_none()
    }

    /// Whether the budget elapsed before the deadline was dropped.
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
