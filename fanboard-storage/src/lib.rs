//! fanboard Storage - Fetch-Once Resource Cache
//!
//! Loads named JSON documents (`schedules`, `goods`, `statistics`, ...) at
//! most once per process and shares the decoded value with every consumer.

pub mod cache;
pub mod telemetry;

pub use cache::{
    CacheConfig, CacheStats, FsFetcher, HttpFetcher, KeyedResourceCache, ResourceFetcher,
    ResourceHandle, ResourceKey, ResourceLocator, ResourceState,
};
pub use telemetry::init_tracing;
