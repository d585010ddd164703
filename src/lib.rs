//! TLS certificate monitor.
//!
//! Reads service definitions from a config source, probes every TLS
//! endpoint of every configured domain on an interval, and exposes
//! certificate expiry, liveness and hostname validity as Prometheus gauges.

// Inputs
pub mod config;
pub mod registry;
pub mod source;

// Probing
pub mod probe;
pub mod scheduler;
pub mod store;

// Cross-cutting concerns
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::WatchConfig;
pub use lifecycle::Shutdown;
pub use registry::Registry;
pub use store::MetricsStore;
