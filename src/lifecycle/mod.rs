//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → Initial config load → Spawn scheduler, poller, watcher → Serve /metrics
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop serving → Scheduler finishes its current step → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Request config reload
//! ```
//!
//! # Design Decisions
//! - Fail fast: an empty or unreadable config at startup is fatal
//! - The listener is bound before any background task starts
//! - Shutdown has a timeout: a stuck sweep does not block exit

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
