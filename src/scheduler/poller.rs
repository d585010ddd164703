//! Periodic change detection against the config source.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::scheduler::trigger::{ReloadHandle, ReloadReason};
use crate::source::{ConfigSource, VersionLedger};

/// Lists the source on an interval and requests a reload when its version
/// tags differ from the last applied ones.
pub struct ChangePoller {
    source: Arc<dyn ConfigSource>,
    ledger: Arc<VersionLedger>,
    reloads: ReloadHandle,
    interval: Duration,
}

impl ChangePoller {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        ledger: Arc<VersionLedger>,
        reloads: ReloadHandle,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            ledger,
            reloads,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(self.interval);
        // The initial load has just run; skip the immediate first tick.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    self.check().await;
                }
            }
        }
    }

    /// Returns whether a change was detected.
    pub async fn check(&self) -> bool {
        let current = match self.source.list().await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot poll config source");
                return false;
            }
        };

        if !self.ledger.differs_from(&current) {
            return false;
        }
        tracing::info!(source = %self.source.describe(), "Config change detected");
        self.reloads.trigger(ReloadReason::ConfigChanged);
        true
    }
}
