//! Concurrent domain → endpoints map.

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::probe::Endpoints;
use crate::registry::is_domain;

/// Latest endpoints per domain.
#[derive(Debug, Default)]
pub struct MetricsStore {
    /// The current generation. Replaced wholesale on flush.
    inner: ArcSwap<DashMap<String, Endpoints>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the endpoints recorded for `domain`.
    pub fn set(&self, domain: &str, endpoints: Endpoints) {
        self.inner.load().insert(domain.to_string(), endpoints);
    }

    /// Copy of the endpoints recorded for `domain`.
    pub fn get(&self, domain: &str) -> Option<Endpoints> {
        self.inner.load().get(domain).map(|entry| entry.value().clone())
    }

    /// Domains with a recorded result. Non-domain keys are filtered out.
    pub fn list_domains(&self) -> Vec<String> {
        self.inner
            .load()
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| is_domain(key))
            .collect()
    }

    /// Drop every recorded result.
    pub fn flush(&self) {
        self.inner.store(Arc::new(DashMap::new()));
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Endpoint;

    fn alive(cn: &str) -> Endpoint {
        Endpoint {
            alive: true,
            valid: true,
            common_name: cn.to_string(),
            alt_names: 1,
            expiry: 1_900_000_000,
            fingerprint: "ab".repeat(32),
        }
    }

    fn endpoints(pairs: &[(&str, Endpoint)]) -> Endpoints {
        pairs.iter().map(|(ip, ep)| (ip.to_string(), ep.clone())).collect()
    }

    #[test]
    fn test_set_replaces_whole_value() {
        let store = MetricsStore::new();
        store.set("example.com", endpoints(&[("192.0.2.1", alive("a")), ("192.0.2.2", alive("a"))]));
        store.set("example.com", endpoints(&[("192.0.2.3", Endpoint::dead())]));

        let got = store.get("example.com").unwrap();
        assert_eq!(got.len(), 1);
        assert!(!got["192.0.2.3"].alive);
    }

    #[test]
    fn test_get_returns_copy() {
        let store = MetricsStore::new();
        store.set("example.com", endpoints(&[("192.0.2.1", alive("a"))]));

        let mut copy = store.get("example.com").unwrap();
        copy.clear();
        assert_eq!(store.get("example.com").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_endpoints_still_listed() {
        let store = MetricsStore::new();
        store.set("unresolved.example.com", Endpoints::new());

        assert_eq!(store.list_domains(), vec!["unresolved.example.com".to_string()]);
        assert_eq!(store.get("unresolved.example.com"), Some(Endpoints::new()));
        assert_eq!(store.get("missing.example.com"), None);
    }

    #[test]
    fn test_labels_filtered_from_listing() {
        let store = MetricsStore::new();
        store.set("set1", Endpoints::new());
        store.set("example.com", Endpoints::new());

        assert_eq!(store.list_domains(), vec!["example.com".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_flush_clears() {
        let store = MetricsStore::new();
        store.set("example.com", Endpoints::new());
        store.flush();

        assert!(store.is_empty());
        assert!(store.get("example.com").is_none());
    }

    #[test]
    fn test_concurrent_get_never_torn() {
        let store = Arc::new(MetricsStore::new());
        let gen_a = endpoints(&[("192.0.2.1", alive("gen-a")), ("192.0.2.2", alive("gen-a"))]);
        let gen_b = endpoints(&[("192.0.2.1", alive("gen-b")), ("192.0.2.2", alive("gen-b"))]);
        store.set("example.com", gen_a.clone());

        let reader = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..5_000 {
                    if let Some(eps) = store.get("example.com") {
                        let names: Vec<_> = eps.values().map(|e| e.common_name.as_str()).collect();
                        assert!(names.windows(2).all(|w| w[0] == w[1]), "torn read: {:?}", names);
                    }
                }
            })
        };

        for i in 0..1_000 {
            store.flush();
            store.set("example.com", if i % 2 == 0 { gen_b.clone() } else { gen_a.clone() });
        }
        reader.join().unwrap();
    }
}
