//! Periodic monitor: re-lists both namespaces on a fixed interval and logs
//! how far the mirror is behind. Read-only; never transfers or commits.

use std::time::Duration;

use gcrsync_core::Inventory;
use gcrsync_registry::RegistryLister;
use tokio::time::{Instant, MissedTickBehavior};

use crate::cancel::CancelSignal;
use crate::snapshot::{take_snapshot, Namespaces};

/// Default time between monitor iterations.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);

/// How long the monitor keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    Forever,
    Iterations(u64),
}

impl MonitorMode {
    /// Map a configured count: `-1` runs forever, `n >= 0` runs `n` times.
    pub fn from_count(count: i64) -> Option<Self> {
        match count {
            -1 => Some(MonitorMode::Forever),
            n if n >= 0 => Some(MonitorMode::Iterations(n as u64)),
            _ => None,
        }
    }
}

/// Summary of a monitor run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Iterations started, successful or not.
    pub iterations: u64,
    /// Iterations whose listing failed.
    pub failures: u64,
    /// Counts from the most recent successful iteration.
    pub last: Option<Inventory>,
}

pub struct Monitor {
    interval: Duration,
    mode: MonitorMode,
}

impl Monitor {
    /// Create a monitor. A zero interval is raised to one millisecond,
    /// since tokio intervals reject a zero period.
    pub fn new(interval: Duration, mode: MonitorMode) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            mode,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    /// Run until the mode is exhausted or `signal` fires.
    ///
    /// The first iteration starts one full interval after the call. A
    /// listing failure ends only that iteration; it is logged and counted.
    pub async fn run<S, T>(
        &self,
        source: &S,
        target: &T,
        namespaces: &Namespaces,
        signal: &CancelSignal,
    ) -> MonitorReport
    where
        S: RegistryLister + ?Sized,
        T: RegistryLister + ?Sized,
    {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut report = MonitorReport::default();

        loop {
            if let MonitorMode::Iterations(n) = self.mode {
                if report.iterations >= n {
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = signal.cancelled() => break,
                _ = ticker.tick() => {}
            }
            report.iterations += 1;

            match take_snapshot(source, target, namespaces).await {
                Ok(snapshot) => {
                    let inventory = snapshot.inventory();
                    tracing::info!(
                        source = inventory.source,
                        target = inventory.target,
                        pending = inventory.pending,
                        "{} images: {} | {} images: {} | waiting: {}",
                        namespaces.source,
                        inventory.source,
                        namespaces.target,
                        inventory.target,
                        inventory.pending,
                    );
                    report.last = Some(inventory);
                }
                Err(e) => {
                    tracing::error!(error = %e, iteration = report.iterations, "monitor listing failed");
                    report.failures += 1;
                }
            }
        }

        report
    }
}
