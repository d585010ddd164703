//! Rebuilding the registry from the config source.

use std::sync::Arc;

use thiserror::Error;

use crate::observability::metrics;
use crate::registry::Registry;
use crate::source::{ConfigSource, SourceError, VersionLedger};
use crate::store::MetricsStore;

#[derive(Debug, Error)]
pub enum ReloadError {
    /// Listing failed. Nothing was changed.
    #[error("config source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// Every listed document failed to fetch. Nothing was changed.
    #[error("none of the {0} listed config documents could be read")]
    FetchFailed(usize),

    /// The reload completed but defined no services.
    #[error("no services defined in {0}")]
    EmptyRegistry(String),
}

/// Counts from one applied reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub documents: usize,
    pub rejected: usize,
    pub services: usize,
    pub domains: usize,
}

/// Applies the documents of a config source to the registry.
pub struct ConfigLoader {
    source: Arc<dyn ConfigSource>,
    registry: Arc<Registry>,
    store: Arc<MetricsStore>,
    ledger: Arc<VersionLedger>,
}

impl ConfigLoader {
    pub fn new(
        source: Arc<dyn ConfigSource>,
        registry: Arc<Registry>,
        store: Arc<MetricsStore>,
        ledger: Arc<VersionLedger>,
    ) -> Self {
        Self {
            source,
            registry,
            store,
            ledger,
        }
    }

    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    /// Replace the registry with the source's current documents.
    ///
    /// Documents are fetched before anything is flushed, so a source that
    /// cannot be read leaves the previous registry and results in place.
    /// Documents that fail to fetch or decode are skipped. Stored results
    /// are cleared so domains removed from config stop being reported.
    pub async fn reload(&self) -> Result<ReloadSummary, ReloadError> {
        let tags = self.source.list().await?;

        let mut documents = Vec::with_capacity(tags.len());
        let mut rejected = 0;
        for key in tags.keys() {
            match self.source.fetch(key).await {
                Ok(raw) => documents.push((key.as_str(), raw)),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Cannot fetch config document");
                    rejected += 1;
                }
            }
        }
        if documents.is_empty() && !tags.is_empty() {
            return Err(ReloadError::FetchFailed(tags.len()));
        }

        self.registry.flush();
        self.store.flush();

        for (key, raw) in &documents {
            match self.registry.update(raw) {
                Ok(services) => tracing::debug!(key = %key, services, "Config document applied"),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Rejected config document");
                    metrics::record_rejected_document();
                    rejected += 1;
                }
            }
        }

        let summary = ReloadSummary {
            documents: documents.len(),
            rejected,
            services: self.registry.service_count(),
            domains: self.registry.list_domains().len(),
        };
        self.ledger.record(tags);

        if self.registry.is_empty() {
            return Err(ReloadError::EmptyRegistry(self.source.describe()));
        }
        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use futures_util::future::BoxFuture;

    use crate::probe::Endpoints;
    use crate::source::VersionTags;

    /// Config source held in memory.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        docs: Mutex<BTreeMap<String, Vec<u8>>>,
        unavailable: AtomicBool,
        unreadable: AtomicBool,
    }

    impl MemorySource {
        pub(crate) fn put(&self, key: &str, body: &str) {
            self.docs.lock().unwrap().insert(key.into(), body.as_bytes().to_vec());
        }

        pub(crate) fn remove(&self, key: &str) {
            self.docs.lock().unwrap().remove(key);
        }

        pub(crate) fn set_unavailable(&self, value: bool) {
            self.unavailable.store(value, Ordering::SeqCst);
        }

        fn set_unreadable(&self, value: bool) {
            self.unreadable.store(value, Ordering::SeqCst);
        }
    }

    impl ConfigSource for MemorySource {
        fn list(&self) -> BoxFuture<'_, Result<VersionTags, SourceError>> {
            Box::pin(async move {
                if self.unavailable.load(Ordering::SeqCst) {
                    return Err(SourceError::List {
                        path: "memory".into(),
                        source: io::Error::new(io::ErrorKind::Other, "offline"),
                    });
                }
                let docs = self.docs.lock().unwrap();
                Ok(docs.iter().map(|(k, v)| (k.clone(), hex::encode(v))).collect())
            })
        }

        fn fetch<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
            Box::pin(async move {
                let missing = || SourceError::Fetch {
                    key: key.to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "gone"),
                };
                if self.unreadable.load(Ordering::SeqCst) {
                    return Err(missing());
                }
                self.docs.lock().unwrap().get(key).cloned().ok_or_else(missing)
            })
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    struct Fixture {
        source: Arc<MemorySource>,
        registry: Arc<Registry>,
        store: Arc<MetricsStore>,
        ledger: Arc<VersionLedger>,
        loader: ConfigLoader,
    }

    fn fixture() -> Fixture {
        let source = Arc::new(MemorySource::default());
        let registry = Arc::new(Registry::new());
        let store = Arc::new(MetricsStore::new());
        let ledger = Arc::new(VersionLedger::new());
        let loader = ConfigLoader::new(source.clone(), registry.clone(), store.clone(), ledger.clone());
        Fixture {
            source,
            registry,
            store,
            ledger,
            loader,
        }
    }

    #[tokio::test]
    async fn test_reload_applies_all_documents() {
        let f = fixture();
        f.source.put("a.json", r#"{"web": {"domains": {"a.example.com": []}}}"#);
        f.source.put("b.json", r#"{"api": {"domains": {"b.example.com": [], "c.example.com": []}}}"#);

        let summary = f.loader.reload().await.unwrap();

        assert_eq!(summary.documents, 2);
        assert_eq!(summary.services, 2);
        assert_eq!(summary.domains, 3);
        assert!(!f.ledger.differs_from(&f.source.list().await.unwrap()));
    }

    #[tokio::test]
    async fn test_reload_drops_removed_domains() {
        let f = fixture();
        f.source.put("a.json", r#"{"web": {"domains": {"a.example.com": []}}}"#);
        f.source.put("b.json", r#"{"api": {"domains": {"b.example.com": []}}}"#);
        f.loader.reload().await.unwrap();
        f.store.set("b.example.com", Endpoints::new());

        f.source.remove("b.json");
        f.loader.reload().await.unwrap();

        assert_eq!(f.registry.list_domains(), vec!["a.example.com"]);
        assert!(f.store.get("b.example.com").is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_skipped() {
        let f = fixture();
        f.source.put("a.json", r#"{"web": {"domains": {"a.example.com": []}}}"#);
        f.source.put("broken.json", "{not json");

        let summary = f.loader.reload().await.unwrap();

        assert_eq!(summary.rejected, 1);
        assert_eq!(f.registry.list_domains(), vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_unavailable_source_keeps_state() {
        let f = fixture();
        f.source.put("a.json", r#"{"web": {"domains": {"a.example.com": []}}}"#);
        f.loader.reload().await.unwrap();
        f.store.set("a.example.com", Endpoints::new());

        f.source.set_unavailable(true);
        let result = f.loader.reload().await;

        assert!(matches!(result, Err(ReloadError::SourceUnavailable(_))));
        assert_eq!(f.registry.list_domains(), vec!["a.example.com"]);
        assert!(f.store.get("a.example.com").is_some());
    }

    #[tokio::test]
    async fn test_unreadable_documents_keep_state() {
        let f = fixture();
        f.source.put("a.json", r#"{"web": {"domains": {"a.example.com": []}}}"#);
        f.loader.reload().await.unwrap();

        f.source.set_unreadable(true);
        let result = f.loader.reload().await;

        assert!(matches!(result, Err(ReloadError::FetchFailed(1))));
        assert_eq!(f.registry.list_domains(), vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_empty_source_is_error() {
        let f = fixture();
        assert!(matches!(f.loader.reload().await, Err(ReloadError::EmptyRegistry(_))));

        f.source.put("empty.json", "{}");
        assert!(matches!(f.loader.reload().await, Err(ReloadError::EmptyRegistry(_))));
    }
}
