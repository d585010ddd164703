//! Sweep scheduling and configuration reloads.
//!
//! # Data Flow
//! ```text
//! ticker (scrape interval) ─────────────┐
//! reload requests ──────────────────────┤
//!   SIGHUP, source poller,              ├─→ engine.rs (one task, one thing at a time)
//!   directory watcher, POST /-/reload   │      ├─ sweep:  Registry → Prober → MetricsStore
//! shutdown ─────────────────────────────┘      └─ reload: ConfigSource → Registry, MetricsStore
//! ```
//!
//! # Design Decisions
//! - Sweeps and reloads never overlap; a reload waits for the running sweep
//! - Pending reload requests coalesce into one
//! - A sweep runs right after every reload, then the interval restarts

pub mod engine;
pub mod poller;
pub mod reload;
pub mod trigger;

pub use engine::{Scheduler, SchedulerState};
pub use poller::ChangePoller;
pub use reload::{ConfigLoader, ReloadError, ReloadSummary};
pub use trigger::{reload_channel, ReloadHandle, ReloadReason, TriggerOutcome};
