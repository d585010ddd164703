//! Config documents from a local directory.

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use sha2::{Digest, Sha256};

use crate::source::{ConfigSource, SourceError, VersionTags};

/// Every regular file in `dir` whose name ends with `suffix` is a document.
/// Its version tag is the hex SHA-256 of its contents.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    suffix: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a file name is a config document for this source.
    pub fn is_document(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
    }

    async fn list_documents(&self) -> Result<VersionTags, SourceError> {
        let list_error = |source| SourceError::List {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(list_error)?;
        let mut tags = VersionTags::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.is_document(&name) {
                continue;
            }

            // Follows symlinks, which is how mounted config volumes appear.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Cannot stat config file");
                    continue;
                }
            }

            match tokio::fs::read(entry.path()).await {
                Ok(contents) => {
                    tags.insert(name, hex::encode(Sha256::digest(&contents)));
                }
                Err(e) => tracing::warn!(file = %name, error = %e, "Cannot read config file"),
            }
        }

        Ok(tags)
    }
}

impl ConfigSource for DirectorySource {
    fn list(&self) -> BoxFuture<'_, Result<VersionTags, SourceError>> {
        Box::pin(self.list_documents())
    }

    fn fetch<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Vec<u8>, SourceError>> {
        Box::pin(async move {
            tokio::fs::read(self.dir.join(key))
                .await
                .map_err(|source| SourceError::Fetch {
                    key: key.to_string(),
                    source,
                })
        })
    }

    fn describe(&self) -> String {
        format!("{} (*{})", self.dir.display(), self.suffix)
    }
}
