//! Consumer-side view of a cache entry.
//!
//! A [`ResourceHandle`] is a read-only subscription to one entry. It never
//! holds a mutable reference into the cache: the decoded value is shared as
//! an `Arc<T>` and failures are handed out by value.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use fanboard_core::{FanboardError, FetchError, KeyError, ResourceStatus};
use tokio::sync::watch;

use super::resource_key::ResourceKey;

/// Decoded value stored in an entry, type-erased for the shared map.
pub(crate) type ErasedValue = Arc<dyn Any + Send + Sync>;

/// State broadcast by an entry's watch channel.
#[derive(Clone)]
pub(crate) enum SlotState {
    Pending,
    Ready(ErasedValue),
    Failed(FanboardError),
}

impl SlotState {
    pub(crate) fn status(&self) -> ResourceStatus {
        match self {
            SlotState::Pending => ResourceStatus::Pending,
            SlotState::Ready(_) => ResourceStatus::Ready,
            SlotState::Failed(_) => ResourceStatus::Failed,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

impl fmt::Debug for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Pending => f.write_str("Pending"),
            SlotState::Ready(_) => f.write_str("Ready(..)"),
            SlotState::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

/// Typed snapshot of an entry.
#[derive(Debug, Clone)]
pub enum ResourceState<T> {
    Pending,
    Ready(Arc<T>),
    Failed(FanboardError),
}

impl<T> ResourceState<T> {
    pub fn status(&self) -> ResourceStatus {
        match self {
            ResourceState::Pending => ResourceStatus::Pending,
            ResourceState::Ready(_) => ResourceStatus::Ready,
            ResourceState::Failed(_) => ResourceStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// Subscription to one cached resource, typed by the shape registered for
/// its key.
///
/// Cloning a handle is cheap; every clone observes the same entry.
pub struct ResourceHandle<T> {
    key: ResourceKey,
    registered: &'static str,
    rx: watch::Receiver<SlotState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            registered: self.registered,
            rx: self.rx.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("key", &self.key)
            .field("type", &self.registered)
            .field("state", &*self.rx.borrow())
            .finish()
    }
}

impl<T: Any + Send + Sync> ResourceHandle<T> {
    pub(crate) fn new(
        key: ResourceKey,
        registered: &'static str,
        rx: watch::Receiver<SlotState>,
    ) -> Self {
        Self {
            key,
            registered,
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Current lifecycle status. Never `Unrequested`: a handle exists only
    /// after its key was requested.
    pub fn status(&self) -> ResourceStatus {
        self.rx.borrow().status()
    }

    /// Typed copy of the current state.
    pub fn snapshot(&self) -> ResourceState<T> {
        let state = self.rx.borrow().clone();
        self.typed(state)
    }

    /// The decoded value, if the entry is `Ready`.
    pub fn value(&self) -> Option<Arc<T>> {
        match self.snapshot() {
            ResourceState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if the entry is `Failed`.
    pub fn error(&self) -> Option<FanboardError> {
        match self.snapshot() {
            ResourceState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Wait until the entry reaches a terminal state.
    ///
    /// Returns immediately if it already has. Every handle for the same key
    /// resolves to the same `Arc` or an equal error.
    pub async fn wait(&self) -> Result<Arc<T>, FanboardError> {
        let mut rx = self.rx.clone();
        let state = match rx.wait_for(SlotState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => {
                return Err(FetchError::Transport {
                    key: self.key.to_string(),
                    reason: "fetch task ended without a result".to_string(),
                }
                .into())
            }
        };

        match self.typed(state) {
            ResourceState::Ready(value) => Ok(value),
            ResourceState::Failed(err) => Err(err),
            ResourceState::Pending => Err(FetchError::Transport {
                key: self.key.to_string(),
                reason: "entry left the terminal state".to_string(),
            }
            .into()),
        }
    }

    fn typed(&self, state: SlotState) -> ResourceState<T> {
        match state {
            SlotState::Pending => ResourceState::Pending,
            SlotState::Failed(err) => ResourceState::Failed(err),
            SlotState::Ready(erased) => match erased.downcast::<T>() {
                Ok(value) => ResourceState::Ready(value),
                Err(_) => ResourceState::Failed(
                    KeyError::TypeMismatch {
                        key: self.key.to_string(),
                        registered: self.registered,
                        requested: std::any::type_name::<T>(),
                    }
                    .into(),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with(state: SlotState) -> (watch::Sender<SlotState>, ResourceHandle<Vec<u32>>) {
        let (tx, rx) = watch::channel(state);
        let key = ResourceKey::parse("numbers").unwrap();
        (tx, ResourceHandle::new(key, std::any::type_name::<Vec<u32>>(), rx))
    }

    #[test]
    fn test_pending_snapshot() {
        let (_tx, handle) = handle_with(SlotState::Pending);
        assert_eq!(handle.status(), ResourceStatus::Pending);
        assert!(handle.value().is_none());
        assert!(handle.error().is_none());
        assert!(!handle.snapshot().is_terminal());
    }

    #[test]
    fn test_ready_snapshot() {
        let value: ErasedValue = Arc::new(vec![1u32, 2, 3]);
        let (_tx, handle) = handle_with(SlotState::Ready(value));
        assert_eq!(handle.status(), ResourceStatus::Ready);
        assert_eq!(*handle.value().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_wrong_erased_type_reports_mismatch() {
        let value: ErasedValue = Arc::new("not a vec".to_string());
        let (_tx, handle) = handle_with(SlotState::Ready(value));
        assert!(matches!(
            handle.error(),
            Some(FanboardError::Key(KeyError::TypeMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_wait_observes_transition() {
        let (tx, handle) = handle_with(SlotState::Pending);
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait().await })
        };

        tx.send_replace(SlotState::Ready(Arc::new(vec![7u32])));
        let value = waiter.await.unwrap().unwrap();
        assert_eq!(*value, vec![7]);
        assert!(Arc::ptr_eq(&value, &handle.value().unwrap()));
    }

    #[tokio::test]
    async fn test_wait_reports_dropped_sender() {
        let (tx, handle) = handle_with(SlotState::Pending);
        drop(tx);
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, FanboardError::Fetch(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_wait_returns_failure() {
        let failure: FanboardError = FetchError::Status {
            key: "numbers".to_string(),
            status: 500,
        }
        .into();
        let (_tx, handle) = handle_with(SlotState::Failed(failure.clone()));
        assert_eq!(handle.wait().await.unwrap_err(), failure);
    }
}
