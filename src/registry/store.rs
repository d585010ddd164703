//! Thread-safe registry of services.
//!
//! Writers build a complete new snapshot and publish it with a single atomic
//! swap; readers load whichever snapshot is current. A reader therefore sees
//! the registry either before or after an update, never halfway through one.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::registry::is_domain;
use crate::registry::service::{decode_document, DecodeError, Service};

/// One immutable generation of the registry.
#[derive(Debug, Default)]
struct Snapshot {
    /// Service name → service. Ordered so the index rebuild is deterministic.
    services: BTreeMap<String, Service>,
    /// Domain → owning service name.
    owners: HashMap<String, String>,
}

impl Snapshot {
    fn rebuild(services: BTreeMap<String, Service>) -> Self {
        let mut owners = HashMap::new();
        for (name, service) in &services {
            for domain in service.domains.keys() {
                if let Some(previous) = owners.insert(domain.clone(), name.clone()) {
                    tracing::warn!(
                        domain = %domain,
                        service = %name,
                        previous = %previous,
                        "Domain defined by more than one service"
                    );
                }
            }
        }
        Self { services, owners }
    }
}

/// Registry of services and the domains they own.
#[derive(Debug, Default)]
pub struct Registry {
    current: ArcSwap<Snapshot>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one config document into the registry.
    ///
    /// Services in the document replace same-named services wholesale.
    /// Returns the number of services the document contained. A malformed
    /// document leaves the registry untouched.
    pub fn update(&self, raw: &[u8]) -> Result<usize, DecodeError> {
        let incoming = decode_document(raw)?;
        let count = incoming.len();

        self.current.rcu(|snapshot| {
            let mut services = snapshot.services.clone();
            services.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
            Arc::new(Snapshot::rebuild(services))
        });

        Ok(count)
    }

    /// Reset to the empty registry.
    pub fn flush(&self) {
        self.current.store(Arc::new(Snapshot::default()));
    }

    /// All known domains. Keys without a dot are labels and are skipped.
    pub fn list_domains(&self) -> Vec<String> {
        self.current
            .load()
            .owners
            .keys()
            .filter(|name| is_domain(name))
            .cloned()
            .collect()
    }

    /// Literal IPs configured for `domain`, with labels expanded.
    ///
    /// An empty result means "resolve through DNS". Unknown domains and
    /// unknown labels contribute nothing.
    pub fn ips_for(&self, domain: &str) -> Vec<String> {
        let snapshot = self.current.load();

        let Some(service) = snapshot
            .owners
            .get(domain)
            .and_then(|owner| snapshot.services.get(owner))
        else {
            return Vec::new();
        };

        let Some(references) = service.domains.get(domain) else {
            return Vec::new();
        };

        let mut ips = Vec::new();
        for reference in references {
            if reference.contains('.') {
                ips.push(reference.clone());
            } else if let Some(set) = service.ips.get(reference) {
                ips.extend(set.iter().cloned());
            } else {
                tracing::debug!(domain = %domain, label = %reference, "Unknown IP set label");
            }
        }
        ips
    }

    /// Name of the service that owns `domain`.
    pub fn service_name(&self, domain: &str) -> Option<String> {
        self.current.load().owners.get(domain).cloned()
    }

    /// Number of services currently registered.
    pub fn service_count(&self) -> usize {
        self.current.load().services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().services.is_empty()
    }
}
