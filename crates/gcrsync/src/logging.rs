//! Global tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::error::{GcrsyncError, Result};

/// Install a fmt subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when
/// `debug` is set and `info` when it is not. Fails if a global subscriber
/// is already installed.
pub fn init(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| GcrsyncError::Logging(e.to_string()))
}
