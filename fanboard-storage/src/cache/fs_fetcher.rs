//! Fetcher that serves documents from a static directory.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fanboard_core::FetchError;

use super::resource_key::ResourceKey;
use super::traits::ResourceFetcher;

/// Reads documents relative to a root directory, the way a static host
/// serves `/data/{key}.json` out of its public folder.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a location against the root. A leading `/` is treated as
    /// the root itself.
    pub fn resolve(&self, location: &str) -> PathBuf {
        self.root.join(location.trim_start_matches('/'))
    }
}

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, key: &ResourceKey, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(location);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound {
                key: key.to_string(),
                location: path.display().to_string(),
            },
            _ => FetchError::Transport {
                key: key.to_string(),
                reason: e.to_string(),
            },
        })
    }
}
