//! Leaf certificate inspection.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_parser::prelude::*;

#[derive(Debug, Error)]
#[error("failed to parse certificate: {0}")]
pub struct CertificateError(String);

/// The parts of a leaf certificate the monitor reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafInfo {
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    /// Not-after, seconds since the Unix epoch.
    pub not_after: i64,
}

/// Parse a DER-encoded certificate.
pub fn inspect(der: &[u8]) -> Result<LeafInfo, CertificateError> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| CertificateError(e.to_string()))?;

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut dns_names = Vec::new();
    let mut ip_addresses = Vec::new();
    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for name in &san.value.general_names {
            match name {
                GeneralName::DNSName(dns) => dns_names.push(dns.to_string()),
                GeneralName::IPAddress(raw) => {
                    if let Some(ip) = ip_from_octets(raw) {
                        ip_addresses.push(ip);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(LeafInfo {
        common_name,
        dns_names,
        ip_addresses,
        not_after: cert.validity().not_after.timestamp(),
    })
}

fn ip_from_octets(raw: &[u8]) -> Option<IpAddr> {
    match raw.len() {
        4 => {
            let octets: [u8; 4] = raw.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = raw.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

/// Hex SHA-256 over the raw certificate bytes.
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

impl LeafInfo {
    /// Check whether the certificate is valid for `host`.
    ///
    /// Only subject alternative names are consulted. A wildcard covers
    /// exactly one leftmost label. IP hosts match IP SANs only.
    pub fn matches_hostname(&self, host: &str) -> bool {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return self.ip_addresses.contains(&ip);
        }

        let host = host.trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        self.dns_names
            .iter()
            .any(|pattern| dns_name_matches(pattern, &host))
    }
}

fn dns_name_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(suffix) if !suffix.is_empty() => match host.split_once('.') {
            Some((label, rest)) => !label.is_empty() && rest == suffix,
            None => false,
        },
        Some(_) => false,
        None => !pattern.is_empty() && pattern == host,
    }
}
