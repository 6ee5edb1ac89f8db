//! Keyed fetch-once resource cache.
//!
//! Each named resource is fetched at most once per process. Consumers get a
//! [`ResourceHandle`] that reports `Pending`, then exactly one of `Ready` or
//! `Failed`, and never changes again.
//!
//! # Example
//!
//! ```ignore
//! let cache = KeyedResourceCache::from_config(FsFetcher::new("public"), &config)?;
//!
//! // Both screens mount at once; only one fetch is issued.
//! let panel = cache.request::<Vec<ScheduleEvent>>("schedules")?;
//! let calendar = cache.request::<Vec<ScheduleEvent>>("schedules")?;
//!
//! let events = panel.wait().await?;
//! assert!(Arc::ptr_eq(&events, &calendar.wait().await?));
//! ```

pub mod fs_fetcher;
pub mod handle;
pub mod http_fetcher;
pub mod keyed;
pub mod resource_key;
pub mod traits;

pub use fs_fetcher::FsFetcher;
pub use handle::{ResourceHandle, ResourceState};
pub use http_fetcher::HttpFetcher;
pub use keyed::{CacheConfig, KeyedResourceCache};
pub use resource_key::{ResourceKey, ResourceLocator};
pub use traits::{CacheStats, ResourceFetcher};
