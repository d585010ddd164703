//! Probe verdicts.

use std::collections::BTreeMap;

/// Result of probing one (domain, IP) pair during one sweep.
///
/// Every field besides `alive` is meaningless when `alive` is false and is
/// left at its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// TLS handshake succeeded and a certificate was retrieved.
    pub alive: bool,
    /// Leaf certificate matches the probed hostname.
    pub valid: bool,
    /// Subject common name of the leaf certificate.
    pub common_name: String,
    /// Number of DNS subject alternative names.
    pub alt_names: usize,
    /// Not-after timestamp, seconds since the Unix epoch.
    pub expiry: i64,
    /// Hex SHA-256 of the leaf certificate DER bytes.
    pub fingerprint: String,
}

impl Endpoint {
    /// Verdict for an address that could not be reached.
    pub fn dead() -> Self {
        Self::default()
    }
}

/// Verdicts for one domain, keyed by the IP string used to connect.
///
/// Empty means no address could be resolved, which is distinct from
/// "resolved, all dead".
pub type Endpoints = BTreeMap<String, Endpoint>;
