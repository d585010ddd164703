//! Certificate probing subsystem.
//!
//! # Data Flow
//! ```text
//! domain ("host" or "host:port") + configured IPs
//!     → prober.rs (split host/port, pick candidates)
//!     → resolver.rs (DNS race against a timer, only when no IPs configured)
//!     → tls.rs (handshake with chain verification disabled)
//!     → certificate.rs (inspect leaf: CN, SANs, expiry, fingerprint, hostname)
//!     → Endpoints (one verdict per IPv4 address)
//! ```
//!
//! # Design Decisions
//! - Failures are verdicts, not errors: a dead address is recorded as dead
//! - Expired or mismatched certificates must still be observed
//! - IPv6 candidates are skipped

pub mod certificate;
pub mod endpoint;
pub mod prober;
pub mod resolver;
pub mod tls;

pub use endpoint::{Endpoint, Endpoints};
pub use prober::{split_host_port, ProbeSettings, Prober};
pub use resolver::{Lookup, SystemLookup};
