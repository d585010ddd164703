//! Filesystem watcher for the service document directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::scheduler::{ReloadHandle, ReloadReason};

/// Name of the symlink swapped by Kubernetes when a mounted ConfigMap changes.
const ATOMIC_DATA_LINK: &str = "..data";

/// Requests a reload whenever a service document changes on disk.
pub struct ConfigWatcher {
    dir: PathBuf,
    suffix: String,
    reloads: ReloadHandle,
}

impl ConfigWatcher {
    pub fn new(dir: &Path, suffix: &str, reloads: ReloadHandle) -> Self {
        Self {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
            reloads,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let suffix = self.suffix.clone();
        let reloads = self.reloads.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant_kind =
                        event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
                    if relevant_kind && event.paths.iter().any(|p| is_relevant(p, &suffix)) {
                        tracing::info!(paths = ?event.paths, "Config document change detected");
                        reloads.trigger(ReloadReason::FileEvent);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = ?self.dir, "Config watcher started");
        Ok(watcher)
    }
}

fn is_relevant(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(suffix) || name == ATOMIC_DATA_LINK)
        .unwrap_or(false)
}
