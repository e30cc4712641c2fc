//! Process-wide configuration, fixed once a [`Syncer`](crate::Syncer) is built.

use std::time::Duration;

use gcrsync_sync::{EngineConfig, MonitorMode, Namespaces, DEFAULT_INTAKE_CAPACITY};
use serde::{Deserialize, Serialize};

use crate::error::{GcrsyncError, Result};

/// Configuration for sync and monitor runs.
///
/// Durations are whole seconds so the struct reads naturally from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Namespace images are mirrored from, e.g. `google_containers`.
    pub source_namespace: String,
    /// Namespace images are mirrored into.
    pub target_namespace: String,
    /// Maximum concurrent transfers.
    pub process_limit: usize,
    /// Maximum concurrent listing queries.
    pub query_limit: usize,
    /// Overall sync budget in seconds; 0 is unbounded.
    pub sync_timeout: u64,
    /// Seconds between monitor iterations.
    pub monitor_interval: u64,
    /// Monitor iterations; -1 runs forever.
    pub monitor_count: i64,
    /// Capacity of the completion record channel, at least
    /// [`DEFAULT_INTAKE_CAPACITY`] so workers do not stall on the collector.
    pub changelog_capacity: usize,
    /// Enable debug logging.
    pub debug: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_namespace: "google_containers".into(),
            target_namespace: "gcrxio".into(),
            process_limit: 2,
            query_limit: 20,
            sync_timeout: 0,
            monitor_interval: 5,
            monitor_count: -1,
            changelog_capacity: DEFAULT_INTAKE_CAPACITY,
            debug: false,
        }
    }
}

impl SyncConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_namespace.is_empty() || self.target_namespace.is_empty() {
            return Err(GcrsyncError::InvalidConfig("namespaces must not be empty".into()));
        }
        if self.process_limit == 0 {
            return Err(GcrsyncError::InvalidConfig("process_limit must be at least 1".into()));
        }
        if self.query_limit == 0 {
            return Err(GcrsyncError::InvalidConfig("query_limit must be at least 1".into()));
        }
        if self.monitor_interval == 0 {
            return Err(GcrsyncError::InvalidConfig(
                "monitor_interval must be at least 1 second".into(),
            ));
        }
        if self.changelog_capacity < DEFAULT_INTAKE_CAPACITY {
            return Err(GcrsyncError::InvalidConfig(format!(
                "changelog_capacity must be at least {DEFAULT_INTAKE_CAPACITY}, got {}",
                self.changelog_capacity
            )));
        }
        if self.monitor_mode().is_none() {
            return Err(GcrsyncError::InvalidConfig(format!(
                "monitor_count must be -1 or non-negative, got {}",
                self.monitor_count
            )));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.sync_timeout)
    }

    pub fn monitor_period(&self) -> Duration {
        Duration::from_secs(self.monitor_interval)
    }

    /// Monitor mode, or `None` if `monitor_count` is below -1.
    pub fn monitor_mode(&self) -> Option<MonitorMode> {
        MonitorMode::from_count(self.monitor_count)
    }

    pub fn namespaces(&self) -> Namespaces {
        Namespaces::new(&self.source_namespace, &self.target_namespace)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            process_limit: self.process_limit,
            deadline: self.deadline(),
            intake_capacity: self.changelog_capacity,
        }
    }
}
