//! Reload requests.

use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// What asked for a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    Startup,
    Signal,
    ConfigChanged,
    FileEvent,
    Admin,
}

impl ReloadReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadReason::Startup => "startup",
            ReloadReason::Signal => "signal",
            ReloadReason::ConfigChanged => "config_changed",
            ReloadReason::FileEvent => "file_event",
            ReloadReason::Admin => "admin",
        }
    }
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking for a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Queued,
    /// A reload was already pending; this request is folded into it.
    Coalesced,
    /// The scheduler is gone.
    Closed,
}

/// Cloneable handle for requesting reloads. Safe to use from non-async code.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: mpsc::Sender<ReloadReason>,
}

/// Create a reload channel holding at most one pending request.
pub fn reload_channel() -> (ReloadHandle, mpsc::Receiver<ReloadReason>) {
    let (tx, rx) = mpsc::channel(1);
    (ReloadHandle { tx }, rx)
}

impl ReloadHandle {
    pub fn trigger(&self, reason: ReloadReason) -> TriggerOutcome {
        match self.tx.try_send(reason) {
            Ok(()) => {
                tracing::debug!(reason = %reason, "Reload requested");
                TriggerOutcome::Queued
            }
            Err(TrySendError::Full(_)) => {
                tracing::debug!(reason = %reason, "Reload already pending");
                TriggerOutcome::Coalesced
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(reason = %reason, "Reload requested after scheduler stopped");
                TriggerOutcome::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let (handle, mut rx) = reload_channel();

        assert_eq!(handle.trigger(ReloadReason::Signal), TriggerOutcome::Queued);
        assert_eq!(handle.trigger(ReloadReason::Admin), TriggerOutcome::Coalesced);
        assert_eq!(rx.try_recv().unwrap(), ReloadReason::Signal);
        assert!(rx.try_recv().is_err());

        assert_eq!(handle.trigger(ReloadReason::Admin), TriggerOutcome::Queued);
    }

    #[test]
    fn test_closed_channel() {
        let (handle, rx) = reload_channel();
        drop(rx);
        assert_eq!(handle.trigger(ReloadReason::FileEvent), TriggerOutcome::Closed);
    }
}
