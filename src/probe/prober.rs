//! Per-domain probing.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_rustls::TlsConnector;

use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::probe::certificate;
use crate::probe::endpoint::{Endpoint, Endpoints};
use crate::probe::resolver::{self, Lookup, SystemLookup};
use crate::probe::tls;

/// Port probed when the domain does not name one.
pub const DEFAULT_PORT: u16 = 443;

/// Timeouts applied to every probe.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    pub connect_timeout: Duration,
    pub lookup_timeout: Duration,
}

impl From<&ProbeConfig> for ProbeSettings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connection_timeout_secs),
            lookup_timeout: Duration::from_secs(config.lookup_timeout_secs),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid port in {0:?}")]
pub struct InvalidPort(pub String);

/// Split `host:port`, defaulting to port 443 when no port is given.
///
/// Bracketed IPv6 (`[::1]:8443`) is accepted. A string with several colons
/// outside brackets is taken as a bare host.
pub fn split_host_port(domain: &str) -> Result<(String, u16), InvalidPort> {
    let parse_port = |port: &str| port.parse::<u16>().map_err(|_| InvalidPort(domain.to_string()));

    if let Some((host, after)) = domain.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        return match after.strip_prefix(':') {
            Some(port) => Ok((host.to_string(), parse_port(port)?)),
            None if after.is_empty() => Ok((host.to_string(), DEFAULT_PORT)),
            None => Err(InvalidPort(domain.to_string())),
        };
    }

    match domain.split_once(':') {
        Some((host, port)) if !port.contains(':') => Ok((host.to_string(), parse_port(port)?)),
        _ => Ok((domain.to_string(), DEFAULT_PORT)),
    }
}

/// The address actually dialled for a candidate, or `None` for IPv6.
fn ipv4_candidate(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Probes the TLS endpoints of a domain.
pub struct Prober {
    connector: TlsConnector,
    lookup: Arc<dyn Lookup>,
    settings: ProbeSettings,
}

impl Prober {
    /// Prober resolving through the system resolver.
    pub fn new(settings: ProbeSettings) -> Result<Self, rustls::Error> {
        Self::with_lookup(settings, Arc::new(SystemLookup))
    }

    pub fn with_lookup(settings: ProbeSettings, lookup: Arc<dyn Lookup>) -> Result<Self, rustls::Error> {
        Ok(Self {
            connector: tls::observing_connector()?,
            lookup,
            settings,
        })
    }

    /// Probe every IPv4 endpoint of `domain`.
    ///
    /// `configured` are IP strings from the registry; when none of them
    /// parse, the host is resolved through DNS instead. Per-address failures
    /// are recorded as dead endpoints. An empty result means nothing could be
    /// resolved.
    pub async fn probe_domain(&self, domain: &str, configured: &[String]) -> Endpoints {
        let (host, port) = match split_host_port(domain) {
            Ok(split) => split,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Skipping unprobeable domain");
                return Endpoints::new();
            }
        };

        let mut candidates: Vec<IpAddr> = configured
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::debug!(domain = %domain, address = %raw, "Ignoring unparsable address");
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            candidates = resolver::resolve(&*self.lookup, &host, self.settings.lookup_timeout).await;
        }

        let mut endpoints = Endpoints::new();
        for ip in candidates {
            let Some(v4) = ipv4_candidate(ip) else {
                continue;
            };
            let endpoint = self.probe_address(SocketAddr::new(IpAddr::V4(v4), port), &host).await;
            metrics::record_endpoint(endpoint.alive);
            endpoints.insert(v4.to_string(), endpoint);
        }
        endpoints
    }

    async fn probe_address(&self, addr: SocketAddr, host: &str) -> Endpoint {
        let der = match tls::fetch_leaf(&self.connector, addr, host, self.settings.connect_timeout).await {
            Ok(der) => der,
            Err(e) => {
                tracing::warn!(host = %host, ip = %addr.ip(), port = addr.port(), error = %e, "Endpoint dead");
                return Endpoint::dead();
            }
        };

        match certificate::inspect(&der) {
            Ok(leaf) => Endpoint {
                alive: true,
                valid: leaf.matches_hostname(host),
                alt_names: leaf.dns_names.len(),
                expiry: leaf.not_after,
                fingerprint: certificate::fingerprint(&der),
                common_name: leaf.common_name,
            },
            Err(e) => {
                tracing::warn!(host = %host, ip = %addr.ip(), error = %e, "Unreadable leaf certificate");
                Endpoint::dead()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_port() {
        assert_eq!(split_host_port("example.com"), Ok(("example.com".into(), 443)));
    }

    #[test]
    fn test_split_with_port() {
        assert_eq!(split_host_port("example.com:8443"), Ok(("example.com".into(), 8443)));
    }

    #[test]
    fn test_split_bracketed_ipv6() {
        assert_eq!(split_host_port("[2001:db8::1]:9443"), Ok(("2001:db8::1".into(), 9443)));
        assert_eq!(split_host_port("[2001:db8::1]"), Ok(("2001:db8::1".into(), 443)));
    }

    #[test]
    fn test_split_bare_ipv6_is_host() {
        assert_eq!(split_host_port("2001:db8::1"), Ok(("2001:db8::1".into(), 443)));
    }

    #[test]
    fn test_split_bad_port() {
        assert!(split_host_port("example.com:https").is_err());
        assert!(split_host_port("example.com:").is_err());
        assert!(split_host_port("example.com:70000").is_err());
    }

    #[test]
    fn test_ipv4_candidates() {
        assert_eq!(ipv4_candidate("192.0.2.1".parse().unwrap()), Some(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(ipv4_candidate("::ffff:192.0.2.1".parse().unwrap()), Some(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(ipv4_candidate("2001:db8::1".parse().unwrap()), None);
    }
}
