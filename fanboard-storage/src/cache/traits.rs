//! Fetcher trait and cache statistics.
//!
//! The cache owns the at-most-once bookkeeping; a fetcher only knows how to
//! turn a location into bytes.

use std::sync::Arc;

use async_trait::async_trait;
use fanboard_core::FetchError;

use super::resource_key::ResourceKey;

/// Source of raw resource documents.
///
/// Implementations are called at most once per key for the lifetime of a
/// [`super::KeyedResourceCache`], and must be `Send + Sync` because the fetch
/// runs on a spawned task.
///
/// # Errors
///
/// - `NotFound` when the location holds no document
/// - `Status` for a non-success response
/// - `Transport` for any other I/O or network failure
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the raw body of the document for `key` at `location`.
    async fn fetch(&self, key: &ResourceKey, location: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<F: ResourceFetcher + ?Sized> ResourceFetcher for Arc<F> {
    async fn fetch(&self, key: &ResourceKey, location: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(key, location).await
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Accepted `request` calls.
    pub requests: u64,
    /// Requests answered by an existing entry (pending or terminal).
    pub hits: u64,
    /// Underlying fetches started; equal to the number of distinct keys requested.
    pub fetches: u64,
    /// Entries that reached `Failed`.
    pub failures: u64,
    /// Number of entries currently in the cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }
}
