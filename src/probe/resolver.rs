//! Bounded-time DNS resolution.
//!
//! The lookup runs as its own task and is raced against a timer. When the
//! timer wins the task is detached, not cancelled: the system resolver gives
//! no way to abort an in-flight query, so its eventual answer is dropped.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::time;

use crate::observability::metrics;

/// A source of address lookups.
pub trait Lookup: Send + Sync + 'static {
    fn lookup(&self, host: String) -> BoxFuture<'static, io::Result<Vec<IpAddr>>>;
}

/// Lookup through the operating system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    fn lookup(&self, host: String) -> BoxFuture<'static, io::Result<Vec<IpAddr>>> {
        Box::pin(async move {
            let mut ips: Vec<IpAddr> = Vec::new();
            for addr in tokio::net::lookup_host((host.as_str(), 0)).await? {
                if !ips.contains(&addr.ip()) {
                    ips.push(addr.ip());
                }
            }
            Ok(ips)
        })
    }
}

/// Resolve `host`, giving up after `timeout`.
///
/// Timeouts and lookup errors both yield an empty list.
pub async fn resolve(lookup: &dyn Lookup, host: &str, timeout: Duration) -> Vec<IpAddr> {
    let task = tokio::spawn(lookup.lookup(host.to_string()));

    match time::timeout(timeout, task).await {
        Ok(Ok(Ok(ips))) => ips,
        Ok(Ok(Err(e))) => {
            tracing::warn!(host = %host, error = %e, "DNS lookup failed");
            metrics::record_lookup_failure("error");
            Vec::new()
        }
        Ok(Err(e)) => {
            tracing::warn!(host = %host, error = %e, "DNS lookup task aborted");
            metrics::record_lookup_failure("error");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(host = %host, timeout = ?timeout, "DNS lookup timed out");
            metrics::record_lookup_failure("timeout");
            Vec::new()
        }
    }
}
