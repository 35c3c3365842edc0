//! # Observer Registry
//!
//! Observers are notified of every entry the engine emits. The registry is a
//! bounded, dense collection of them, guarded by its own short-lived lock that
//! is independent of the write lock and of the dispatch queue lock.
//!
//! ## Snapshot-then-invoke
//!
//! [`CallbackRegistry::snapshot_and_dispatch`] copies the registered observers
//! while holding the lock, releases it, and only then invokes them. Observer
//! code may be slow or may itself register or unregister observers; it never
//! runs while the registry lock is held.
//!
//! ## Identity
//!
//! An observer is identified by its `Arc` allocation. Registering the same
//! `Arc` twice is rejected; two separately allocated observers with equal
//! state are distinct registrations.

use crate::constants::{DIAGNOSTICS_TARGET, MAX_OBSERVERS};
use crate::error::{LogError, Result};
use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

/// One emitted entry as seen by observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub timestamp: String,
}

/// Receiver of log events.
///
/// Implemented for any `Fn(&LogEvent) + Send + Sync` closure, so user context
/// is simply whatever the closure captures.
#[cfg_attr(test, mockall::automock)]
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &LogEvent);
}

impl<F> Observer for F
where
    F: Fn(&LogEvent) + Send + Sync,
{
    fn on_event(&self, event: &LogEvent) {
        self(event)
    }
}

fn same_observer(a: &Arc<dyn Observer>, b: &Arc<dyn Observer>) -> bool {
    // Compare data addresses only; vtable pointers are not a stable identity
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Bounded set of registered observers
pub struct CallbackRegistry {
    entries: Mutex<Vec<Arc<dyn Observer>>>,
    capacity: usize,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    /// Registry holding up to [`MAX_OBSERVERS`] observers
    pub fn new() -> Self {
        Self::with_capacity(MAX_OBSERVERS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    // An observer panicking elsewhere must not disable registration
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Observer>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reject a missing observer handle before registration
    pub fn validate(observer: Option<&Arc<dyn Observer>>) -> Result<()> {
        match observer {
            Some(_) => Ok(()),
            None => Err(LogError::InvalidObserver),
        }
    }

    /// Add `observer`.
    ///
    /// Fails with `ObserverLimit` when the registry is full and with
    /// `DuplicateObserver` when the same observer is already registered.
    pub fn register(&self, observer: Arc<dyn Observer>) -> Result<()> {
        let mut entries = self.lock();

        if entries.iter().any(|existing| same_observer(existing, &observer)) {
            return Err(LogError::DuplicateObserver);
        }
        if entries.len() >= self.capacity {
            return Err(LogError::ObserverLimit {
                capacity: self.capacity,
            });
        }

        entries.push(observer);
        Ok(())
    }

    /// Remove `observer`. The last entry moves into the freed slot so the
    /// collection stays dense.
    pub fn unregister(&self, observer: &Arc<dyn Observer>) -> Result<()> {
        let mut entries = self.lock();
        let index = entries
            .iter()
            .position(|existing| same_observer(existing, observer))
            .ok_or(LogError::ObserverNotFound)?;
        entries.swap_remove(index);
        Ok(())
    }

    /// Whether `observer` is currently registered
    pub fn contains(&self, observer: &Arc<dyn Observer>) -> bool {
        self.lock().iter().any(|existing| same_observer(existing, observer))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy the live observers under the lock, then notify each of them with
    /// the lock released. Returns the number of observers notified.
    ///
    /// A panicking observer is reported and skipped; the remaining observers
    /// still receive the event.
    pub fn snapshot_and_dispatch(&self, event: &LogEvent) -> usize {
        let snapshot: Vec<Arc<dyn Observer>> = self.lock().clone();

        for observer in &snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event)));
            if outcome.is_err() {
                error!(
                    target: DIAGNOSTICS_TARGET,
                    "Observer panicked while handling {} entry", event.level
                );
            }
        }

        snapshot.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(message: &str) -> LogEvent {
        LogEvent {
            level: Level::Info,
            message: message.to_string(),
            timestamp: "2025-01-01 00:00:00".to_string(),
        }
    }

    fn counting_observer(counter: Arc<AtomicUsize>) -> Arc<dyn Observer> {
        Arc::new(move |_: &LogEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_mock_observer_receives_event() {
        let mut mock = MockObserver::new();
        mock.expect_on_event()
            .withf(|event| event.message == "hello" && event.level == Level::Info)
            .times(1)
            .return_const(());

        let registry = CallbackRegistry::new();
        registry.register(Arc::new(mock)).unwrap();
        assert_eq!(registry.snapshot_and_dispatch(&event("hello")), 1);
    }

    #[test]
    fn test_validate_rejects_missing_observer() {
        assert!(matches!(
            CallbackRegistry::validate(None),
            Err(LogError::InvalidObserver)
        ));
        let observer = counting_observer(Arc::new(AtomicUsize::new(0)));
        assert!(CallbackRegistry::validate(Some(&observer)).is_ok());
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = CallbackRegistry::new();
        let observer = counting_observer(Arc::new(AtomicUsize::new(0)));
        registry.register(observer.clone()).unwrap();
        assert!(matches!(
            registry.register(observer.clone()),
            Err(LogError::DuplicateObserver)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_keeps_registry_dense() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let observers: Vec<_> = (0..4).map(|_| counting_observer(counter.clone())).collect();
        for observer in &observers {
            registry.register(observer.clone()).unwrap();
        }

        registry.unregister(&observers[1]).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(!registry.contains(&observers[1]));
        assert!(registry.contains(&observers[3]));

        registry.snapshot_and_dispatch(&event("after removal"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_panicking_observer_does_not_stop_dispatch() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry
            .register(Arc::new(|_: &LogEvent| panic!("observer failure")))
            .unwrap();
        registry.register(counting_observer(counter.clone())).unwrap();

        assert_eq!(registry.snapshot_and_dispatch(&event("boom")), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
