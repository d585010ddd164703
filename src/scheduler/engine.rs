//! The scheduler loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::observability::metrics;
use crate::probe::Prober;
use crate::registry::Registry;
use crate::scheduler::reload::{ConfigLoader, ReloadError, ReloadSummary};
use crate::scheduler::trigger::ReloadReason;
use crate::store::MetricsStore;

/// What the scheduler is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sweeping,
    Reloading,
}

/// Runs sweeps on an interval and applies reloads between them.
pub struct Scheduler {
    registry: Arc<Registry>,
    store: Arc<MetricsStore>,
    prober: Arc<Prober>,
    loader: ConfigLoader,
    interval: Duration,
    concurrency: usize,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<MetricsStore>,
        prober: Arc<Prober>,
        loader: ConfigLoader,
        schedule: &ScheduleConfig,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            registry,
            store,
            prober,
            loader,
            interval: Duration::from_secs(schedule.scrape_interval_secs),
            concurrency: schedule.sweep_concurrency.max(1),
            state,
        }
    }

    /// Follow state transitions.
    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Run until shutdown. The first sweep starts immediately.
    pub async fn run(
        self,
        mut reloads: mpsc::Receiver<ReloadReason>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            concurrency = self.concurrency,
            "Scheduler started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Scheduler received shutdown signal, exiting loop");
                    break;
                }
                Some(reason) = reloads.recv() => {
                    // Failures are logged and counted; the previous state keeps serving.
                    let _ = self.reload(reason).await;
                    ticker.reset_immediately();
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }
    }

    /// Reload from the config source.
    pub async fn reload(&self, reason: ReloadReason) -> Result<ReloadSummary, ReloadError> {
        self.state.send_replace(SchedulerState::Reloading);
        tracing::info!(reason = %reason, source = %self.loader.source().describe(), "Reloading config");

        let result = self.loader.reload().await;
        match &result {
            Ok(summary) => tracing::info!(
                reason = %reason,
                documents = summary.documents,
                rejected = summary.rejected,
                services = summary.services,
                domains = summary.domains,
                "Config reloaded"
            ),
            Err(e) => tracing::error!(reason = %reason, error = %e, "Config reload failed"),
        }
        metrics::record_reload(reason.as_str(), result.is_ok());

        self.state.send_replace(SchedulerState::Idle);
        result
    }

    /// Probe every domain once and store the results. Returns the domain count.
    pub async fn sweep(&self) -> usize {
        self.state.send_replace(SchedulerState::Sweeping);
        let started = Instant::now();

        let domains = self.registry.list_domains();
        tracing::debug!(domains = domains.len(), "Sweep started");

        let registry = &self.registry;
        let store = &self.store;
        let prober = &self.prober;
        futures_util::stream::iter(domains.iter())
            .for_each_concurrent(self.concurrency, |domain| async move {
                let ips = registry.ips_for(domain);
                let endpoints = prober.probe_domain(domain, &ips).await;
                tracing::debug!(domain = %domain, endpoints = endpoints.len(), "Domain probed");
                store.set(domain, endpoints);
            })
            .await;

        let elapsed = started.elapsed();
        metrics::record_sweep(elapsed, domains.len());
        tracing::info!(
            domains = domains.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Sweep finished"
        );

        self.state.send_replace(SchedulerState::Idle);
        domains.len()
    }
}
