//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Run the initial config load
//! - Start background tasks (scheduler, poller, watcher, signals)
//! - Serve metrics until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The metrics listener starts last, once there is something to report

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time;

use crate::config::watcher::ConfigWatcher;
use crate::config::WatchConfig;
use crate::http::server::{AppState, MetricsServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::probe::{ProbeSettings, Prober};
use crate::registry::Registry;
use crate::scheduler::{
    reload_channel, ChangePoller, ConfigLoader, ReloadError, ReloadReason, Scheduler,
};
use crate::source::{ConfigSource, DirectorySource, VersionLedger};
use crate::store::MetricsStore;

/// How long the scheduler may take to finish its current step on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot build TLS client: {0}")]
    Tls(#[from] rustls::Error),

    #[error("initial config load failed: {0}")]
    InitialLoad(#[from] ReloadError),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the monitor until a shutdown signal arrives.
pub async fn run(config: WatchConfig) -> Result<(), StartupError> {
    let prometheus = match metrics::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Self-metrics disabled");
            None
        }
    };

    let registry = Arc::new(Registry::new());
    let store = Arc::new(MetricsStore::new());
    let ledger = Arc::new(VersionLedger::new());
    let directory = DirectorySource::new(&config.source.config_dir, &config.source.config_file_suffix);
    let source: Arc<dyn ConfigSource> = Arc::new(directory.clone());
    let prober = Arc::new(Prober::new(ProbeSettings::from(&config.probe))?);

    let loader = ConfigLoader::new(source.clone(), registry.clone(), store.clone(), ledger.clone());
    let scheduler = Scheduler::new(
        registry.clone(),
        store.clone(),
        prober,
        loader,
        &config.schedule,
    );
    scheduler.reload(ReloadReason::Startup).await?;

    let address = config.observability.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Arc::new(Shutdown::new());
    let (reloads, reload_rx) = reload_channel();

    let scheduler_task = tokio::spawn(scheduler.run(reload_rx, shutdown.subscribe()));

    if config.schedule.reload_poll_secs > 0 {
        let poller = ChangePoller::new(
            source,
            ledger,
            reloads.clone(),
            Duration::from_secs(config.schedule.reload_poll_secs),
        );
        tokio::spawn(poller.run(shutdown.subscribe()));
    }

    // Dropping the watcher stops it, so it lives until run() returns.
    let _watcher = if config.source.watch {
        match ConfigWatcher::new(directory.dir(), &config.source.config_file_suffix, reloads.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Directory watch unavailable, relying on polling");
                None
            }
        }
    } else {
        None
    };

    let signal_reloads = reloads.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::listen(signal_reloads, signal_shutdown).await {
            tracing::error!(error = %e, "Cannot install signal handlers");
        }
    });

    let server = MetricsServer::new(AppState {
        registry,
        store,
        reloads,
        prometheus,
    });
    let served = server.run(listener, shutdown.subscribe()).await;

    shutdown.trigger();
    if time::timeout(SHUTDOWN_GRACE, scheduler_task).await.is_err() {
        tracing::warn!("Scheduler did not stop in time");
    }

    served.map_err(StartupError::Serve)?;
    tracing::info!("Shutdown complete");
    Ok(())
}
