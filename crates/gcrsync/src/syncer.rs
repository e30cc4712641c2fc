//! The Syncer: unified API for mirroring and monitoring.
//!
//! The Syncer owns the configuration and the collaborators (listers,
//! transfer executor, committer) and hands them to the engine per run.

use std::sync::Arc;

use gcrsync_changelog::Committer;
use gcrsync_registry::{Catalog, CatalogLister, ImageTransfer, RegistryLister};
use gcrsync_sync::{CancelSignal, Monitor, MonitorReport, SyncEngine, SyncReport};

use crate::config::SyncConfig;
use crate::error::{GcrsyncError, Result};

/// Mirrors images from the source namespace into the target namespace.
///
/// Provides:
/// - One-shot sync runs with a single changelog commit
/// - A periodic read-only monitor of the backlog
pub struct Syncer<S, T, X: ?Sized, C> {
    config: SyncConfig,
    engine: SyncEngine,
    monitor: Monitor,
    source: S,
    target: T,
    transfer: Arc<X>,
    committer: C,
}

impl<S, T, X, C> Syncer<S, T, X, C>
where
    S: RegistryLister,
    T: RegistryLister,
    X: ImageTransfer + ?Sized + 'static,
    C: Committer,
{
    /// Create a syncer. Fails if the configuration does not validate.
    pub fn new(
        config: SyncConfig,
        source: S,
        target: T,
        transfer: Arc<X>,
        committer: C,
    ) -> Result<Self> {
        config.validate()?;
        let mode = config.monitor_mode().ok_or_else(|| {
            GcrsyncError::InvalidConfig(format!("monitor_count {}", config.monitor_count))
        })?;
        tracing::debug!(?config, "syncer configured");
        let engine = SyncEngine::new(config.engine_config());
        let monitor = Monitor::new(config.monitor_period(), mode);
        Ok(Self {
            config,
            engine,
            monitor,
            source,
            target,
            transfer,
            committer,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one sync pass.
    ///
    /// Returns an error if listing either namespace fails or if the
    /// changelog commit fails. Individual transfer failures and an expired
    /// deadline are reported in the [`SyncReport`].
    pub async fn sync(&self) -> Result<SyncReport> {
        let report = self
            .engine
            .run(
                &self.source,
                &self.target,
                &self.config.namespaces(),
                Arc::clone(&self.transfer),
                &self.committer,
            )
            .await?;
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Monitor
    // ─────────────────────────────────────────────────────────────────────────

    /// Log the backlog periodically until the configured count is reached
    /// or `signal` fires.
    pub async fn monitor(&self, signal: &CancelSignal) -> MonitorReport {
        self.monitor
            .run(&self.source, &self.target, &self.config.namespaces(), signal)
            .await
    }
}

impl<SC, TC, X, C> Syncer<CatalogLister<SC>, CatalogLister<TC>, X, C>
where
    SC: Catalog + 'static,
    TC: Catalog + 'static,
    X: ImageTransfer + ?Sized + 'static,
    C: Committer,
{
    /// Create a syncer over two registry catalogs, listing each with at
    /// most `query_limit` concurrent tag queries.
    pub fn with_catalogs(
        config: SyncConfig,
        source: SC,
        target: TC,
        transfer: Arc<X>,
        committer: C,
    ) -> Result<Self> {
        let query_limit = config.query_limit;
        Self::new(
            config,
            CatalogLister::new(source, query_limit),
            CatalogLister::new(target, query_limit),
            transfer,
            committer,
        )
    }
}
