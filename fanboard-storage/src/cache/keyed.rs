//! Keyed fetch-once cache.
//!
//! Each key moves through `Unrequested -> Pending -> Ready | Failed` exactly
//! once. The first `request` for a key inserts a `Pending` entry under the
//! map lock and spawns the single fetch; everyone else subscribes to that
//! entry. Terminal entries are never refreshed, retried or evicted.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fanboard_core::{
    ConfigError, DataLayerConfig, DecodeError, FanboardError, FetchError, KeyError,
    ResourceStatus,
};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::handle::{ErasedValue, ResourceHandle, SlotState};
use super::resource_key::{ResourceKey, ResourceLocator};
use super::traits::{CacheStats, ResourceFetcher};

/// Configuration for the keyed cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Deadline for a single fetch. When it expires the entry becomes
    /// `Failed(Timeout)`; `None` leaves a stuck fetch `Pending`.
    pub fetch_timeout: Option<Duration>,
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn from_data_layer(config: &DataLayerConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

/// One cache entry. The decoded type is fixed by the first request.
struct Slot {
    type_id: TypeId,
    type_name: &'static str,
    state: watch::Sender<SlotState>,
}

impl Slot {
    fn new<T: 'static>() -> Self {
        let (state, _) = watch::channel(SlotState::Pending);
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            state,
        }
    }

    fn check_type<T: 'static>(&self, key: &ResourceKey) -> Result<(), KeyError> {
        if self.type_id == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(KeyError::TypeMismatch {
                key: key.to_string(),
                registered: self.type_name,
                requested: type_name::<T>(),
            })
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    hits: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

/// Process-scoped keyed resource cache.
///
/// Construct one per application and hand clones to consumers; clones share
/// the same entries. Tests build isolated instances.
///
/// # Type Parameters
///
/// - `F`: the fetcher that retrieves raw documents on first request
///
/// # Example
///
/// ```ignore
/// let cache = KeyedResourceCache::new(FsFetcher::new("public"), ResourceLocator::default(), CacheConfig::default());
/// let schedules = cache.request::<Vec<ScheduleEvent>>("schedules")?;
/// match schedules.snapshot() {
///     ResourceState::Pending => render_spinner(),
///     ResourceState::Ready(events) => render(&events),
///     ResourceState::Failed(_) => render_empty(),
/// }
/// ```
pub struct KeyedResourceCache<F: ResourceFetcher> {
    fetcher: Arc<F>,
    locator: ResourceLocator,
    config: CacheConfig,
    slots: Arc<Mutex<HashMap<ResourceKey, Arc<Slot>>>>,
    counters: Arc<Counters>,
}

impl<F: ResourceFetcher + 'static> KeyedResourceCache<F> {
    /// Create a new keyed cache.
    pub fn new(fetcher: F, locator: ResourceLocator, config: CacheConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            locator,
            config,
            slots: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Create a cache from the data-layer configuration.
    pub fn from_config(fetcher: F, config: &DataLayerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            fetcher,
            ResourceLocator::from_config(config)?,
            CacheConfig::from_data_layer(config),
        ))
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the key-to-location mapping.
    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    /// Request a resource, starting its fetch if this is the first request.
    ///
    /// The returned handle reports `Pending` until the single fetch for the
    /// key resolves, then the same terminal state forever. A failed key is
    /// not retried.
    ///
    /// The key is bound to `T` on first request; requesting it later as a
    /// different type fails with `KeyError::TypeMismatch`.
    ///
    /// Must be called from within a Tokio runtime, which runs the fetch.
    ///
    /// # Errors
    ///
    /// Only `KeyError`: an empty or malformed key, or a type mismatch.
    /// Fetch and decode failures are reported through the handle.
    pub fn request<T>(&self, key: &str) -> Result<ResourceHandle<T>, KeyError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let key = ResourceKey::parse(key)?;

        // Check-then-insert under one lock: exactly one caller sees `created`.
        let (slot, created) = {
            let mut slots = self.lock_slots();
            match slots.get(&key) {
                Some(slot) => (Arc::clone(slot), false),
                None => {
                    let slot = Arc::new(Slot::new::<T>());
                    slots.insert(key.clone(), Arc::clone(&slot));
                    (slot, true)
                }
            }
        };

        if created {
            self.counters.requests.fetch_add(1, Ordering::Relaxed);
            self.counters.fetches.fetch_add(1, Ordering::Relaxed);
            self.spawn_fetch::<T>(key.clone(), Arc::clone(&slot));
        } else {
            slot.check_type::<T>(&key)?;
            self.counters.requests.fetch_add(1, Ordering::Relaxed);
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, status = %slot.state.borrow().status(), "resource cache hit");
        }

        let rx = slot.state.subscribe();
        Ok(ResourceHandle::new(key, slot.type_name, rx))
    }

    /// Request a resource as untyped JSON.
    pub fn request_json(&self, key: &str) -> Result<ResourceHandle<serde_json::Value>, KeyError> {
        self.request::<serde_json::Value>(key)
    }

    /// Request several keys of the same shape at once.
    ///
    /// All keys are validated before any fetch starts.
    pub fn prefetch<T>(&self, keys: &[&str]) -> Result<Vec<ResourceHandle<T>>, KeyError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        for key in keys {
            ResourceKey::parse(key)?;
        }
        keys.iter().map(|key| self.request::<T>(key)).collect()
    }

    /// Status of `key` without requesting it.
    pub fn status_of(&self, key: &str) -> ResourceStatus {
        let Ok(key) = ResourceKey::parse(key) else {
            return ResourceStatus::Unrequested;
        };
        self.lock_slots()
            .get(&key)
            .map(|slot| slot.state.borrow().status())
            .unwrap_or(ResourceStatus::Unrequested)
    }

    /// Keys that have been requested, in sorted order.
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self.lock_slots().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            entry_count: self.lock_slots().len() as u64,
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<ResourceKey, Arc<Slot>>> {
        // The critical sections only insert or read, so a poisoned map is still consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_fetch<T>(&self, key: ResourceKey, slot: Arc<Slot>)
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        let location = self.locator.locate(&key);
        let timeout = self.config.fetch_timeout;
        let counters = Arc::clone(&self.counters);

        // Detached: the entry resolves even if every consumer has gone away.
        tokio::spawn(async move {
            info!(key = %key, location = %location, "fetching resource");

            // A panicking fetcher must still leave the entry terminal.
            let fetch = fetch_and_decode::<F, T>(&*fetcher, &key, &location, timeout);
            let outcome = AssertUnwindSafe(fetch)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(FetchError::Transport {
                        key: key.to_string(),
                        reason: format!("fetch panicked: {}", panic_message(payload.as_ref())),
                    }
                    .into())
                });
            let state = match outcome {
                Ok(value) => {
                    info!(key = %key, "resource ready");
                    SlotState::Ready(value)
                }
                Err(err) => {
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %key, error = %err, "resource failed; it will not be retried");
                    SlotState::Failed(err)
                }
            };
            slot.state.send_replace(state);
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

async fn fetch_and_decode<F, T>(
    fetcher: &F,
    key: &ResourceKey,
    location: &str,
    timeout: Option<Duration>,
) -> Result<ErasedValue, FanboardError>
where
    F: ResourceFetcher + ?Sized,
    T: DeserializeOwned + Send + Sync + 'static,
{
    let body = match timeout {
        Some(after) => tokio::time::timeout(after, fetcher.fetch(key, location))
            .await
            .map_err(|_| FetchError::Timeout {
                key: key.to_string(),
                after,
            })??,
        None => fetcher.fetch(key, location).await?,
    };

    let value: T = serde_json::from_slice(&body).map_err(|e| DecodeError::InvalidJson {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Arc::new(value))
}

impl<F: ResourceFetcher> Clone for KeyedResourceCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            locator: self.locator.clone(),
            config: self.config.clone(),
            slots: Arc::clone(&self.slots),
            counters: Arc::clone(&self.counters),
        }
    }
}
