//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms about the monitor itself)
//!
//! Consumers:
//!     → Log aggregation (stdout, plain or JSON)
//!     → /metrics (rendered after the certificate gauges)
//! ```
//!
//! # Design Decisions
//! - Structured fields (domain, ip, error) on every event
//! - Self-metrics go through the `metrics` facade; without an installed
//!   recorder they are no-ops, which keeps tests free of global state

pub mod logging;
pub mod metrics;
