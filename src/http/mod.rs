//! HTTP surface of the monitor.
//!
//! # Data Flow
//! ```text
//! GET /metrics
//!     → exposition.rs (MetricsStore + Registry → certificate gauges)
//!     → PrometheusHandle (self-metrics, appended)
//!
//! POST /-/reload → scheduler reload request (coalesced)
//! GET  /healthz  → liveness
//! ```

pub mod exposition;
pub mod server;

pub use server::MetricsServer;
