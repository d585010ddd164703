//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to shutdown or reload requests
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second SIGTERM/SIGINT forces exit
//! - SIGHUP triggers config reload, not shutdown

use std::io;
use std::sync::Arc;

use crate::lifecycle::Shutdown;
use crate::scheduler::{ReloadHandle, ReloadReason};

/// Exit status used when shutdown is forced by a repeated signal.
const FORCED_EXIT_CODE: i32 = 130;

#[cfg(unix)]
pub async fn listen(reloads: ReloadHandle, shutdown: Arc<Shutdown>) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut stopping = false;

    loop {
        let name = tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, requesting config reload");
                reloads.trigger(ReloadReason::Signal);
                continue;
            }
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        };

        if stopping {
            tracing::warn!(signal = name, "Second shutdown signal, exiting immediately");
            std::process::exit(FORCED_EXIT_CODE);
        }
        tracing::info!(signal = name, "Shutting down");
        stopping = true;
        shutdown.trigger();
    }
}

#[cfg(not(unix))]
pub async fn listen(_reloads: ReloadHandle, shutdown: Arc<Shutdown>) -> io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, shutting down");
    shutdown.trigger();

    tokio::signal::ctrl_c().await?;
    tracing::warn!("Second shutdown signal, exiting immediately");
    std::process::exit(FORCED_EXIT_CODE);
}
