//! Service and domain registry.
//!
//! # Data Flow
//! ```text
//! config document (JSON)
//!     → service.rs (decode into named services)
//!     → store.rs (merge by service name, rebuild domain → service index)
//!     → snapshot published atomically
//!
//! Readers (scheduler, exposition):
//!     list_domains / ips_for / service_name
//!     → read one immutable snapshot, return owned copies
//! ```
//!
//! # Design Decisions
//! - A key without a dot is a label, never a domain
//! - Labels expand one level only (label → literal IPs)
//! - The reverse index is rebuilt on every update, never patched

pub mod service;
pub mod store;

pub use service::{DecodeError, Service};
pub use store::Registry;

/// True when `name` is a real domain rather than an IP-set label.
pub fn is_domain(name: &str) -> bool {
    name.contains('.')
}
