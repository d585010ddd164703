//! Config change detection over version tags.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::source::VersionTags;

/// Whether `current` differs from `previous` by any added, modified or
/// removed key.
pub fn config_changed(previous: &VersionTags, current: &VersionTags) -> bool {
    let mut changed = false;

    for (key, tag) in current {
        match previous.get(key) {
            None => {
                tracing::debug!(key = %key, "Config added");
                changed = true;
            }
            Some(old) if old != tag => {
                tracing::debug!(key = %key, "Config modified");
                changed = true;
            }
            Some(_) => {}
        }
    }

    for key in previous.keys() {
        if !current.contains_key(key) {
            tracing::debug!(key = %key, "Config removed");
            changed = true;
        }
    }

    changed
}

/// Version tags as of the last reload that was applied.
#[derive(Debug, Default)]
pub struct VersionLedger {
    applied: ArcSwap<VersionTags>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tags a reload has just applied.
    pub fn record(&self, tags: VersionTags) {
        self.applied.store(Arc::new(tags));
    }

    pub fn differs_from(&self, current: &VersionTags) -> bool {
        config_changed(&self.applied.load(), current)
    }
}
