//! Latest probe results, shared between the scheduler and exposition.
//!
//! # Data Flow
//! ```text
//! Scheduler sweep
//!     → set(domain, endpoints)   (whole-value replace per domain)
//!
//! Exposition scrape
//!     → list_domains / get       (owned copies)
//!
//! Reload
//!     → flush                    (swap in an empty map)
//! ```
//!
//! # Design Decisions
//! - Per-domain writes never merge old and new endpoints
//! - Flush publishes a fresh map in one atomic swap
//! - Writers never block readers for more than one map entry

pub mod results;

pub use results::MetricsStore;
