//! Periodic resolver sweeps.
//!
//! The background counterpart of the command surface: a spawned task that
//! re-resolves all manifests on a fixed interval. Sweeps are not guarded
//! against overlap; the pending set is overwritten whole, last writer
//! wins.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::manager::UpdateManager;

/// Default sweep interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Drives [`UpdateManager::check_all`] on a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct UpdateScheduler {
    interval: Duration,
}

impl UpdateScheduler {
    /// Create a scheduler with a custom interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Create a scheduler on the default daily interval.
    pub fn daily() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the sweep loop; the first sweep runs immediately. Failures
    /// are logged and the loop keeps running until the task is aborted.
    pub fn spawn(self, manager: Arc<UpdateManager>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                match manager.check_all().await {
                    Ok(count) => {
                        tracing::info!(pending = count, "Update check complete");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Update check failed");
                    }
                }
            }
        })
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::daily()
    }
}
