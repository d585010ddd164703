//! Configuration sources and change detection.
//!
//! # Data Flow
//! ```text
//! ConfigSource::list()          → key → version tag
//!     → detector.rs             (compare with the last applied tags)
//!     → reload requested on any addition, modification or removal
//!
//! ConfigSource::fetch(key)      → raw document bytes → Registry::update
//! ```
//!
//! # Design Decisions
//! - Sources are addressed through a trait so storage backends stay
//!   outside the scheduler
//! - Version tags are opaque; only equality matters

pub mod detector;
pub mod directory;

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use detector::{config_changed, VersionLedger};
pub use directory::DirectorySource;

/// Config object key → opaque content version.
pub type VersionTags = BTreeMap<String, String>;

/// The config source could not be listed or read.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Where config documents come from.
pub trait ConfigSource: Send + Sync + 'static {
    /// Current documents and their version tags.
    fn list(&self) -> BoxFuture<'_, Result<VersionTags, SourceError>>;

    /// Raw bytes of one document.
    fn fetch<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
