use logbook::constants::MAX_OBSERVERS;
use logbook::{CallbackRegistry, Level, LogError, LogEvent, Observer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn event(message: &str) -> LogEvent {
    LogEvent {
        level: Level::Warn,
        message: message.to_string(),
        timestamp: "2025-01-01 12:00:00".to_string(),
    }
}

fn counting_observer(counter: &Arc<AtomicUsize>) -> Arc<dyn Observer> {
    let counter = Arc::clone(counter);
    Arc::new(move |_: &LogEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_eleventh_observer_is_rejected() {
    let registry = CallbackRegistry::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..MAX_OBSERVERS {
        registry
            .register(counting_observer(&counter))
            .expect("Registry should accept observers up to capacity");
    }

    let result = registry.register(counting_observer(&counter));
    assert!(matches!(
        result,
        Err(LogError::ObserverLimit { capacity }) if capacity == MAX_OBSERVERS
    ));
    assert_eq!(registry.len(), MAX_OBSERVERS);
}

#[test]
fn test_unregister_unknown_observer() {
    let registry = CallbackRegistry::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let registered = counting_observer(&counter);
    let stranger = counting_observer(&counter);
    registry.register(registered).unwrap();

    assert!(matches!(
        registry.unregister(&stranger),
        Err(LogError::ObserverNotFound)
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_unregister_frees_a_slot() {
    let registry = CallbackRegistry::with_capacity(2);
    let counter = Arc::new(AtomicUsize::new(0));
    let first = counting_observer(&counter);
    let second = counting_observer(&counter);
    let third = counting_observer(&counter);

    registry.register(first.clone()).unwrap();
    registry.register(second).unwrap();
    assert!(registry.register(third.clone()).is_err());

    registry.unregister(&first).unwrap();
    registry.register(third).expect("Freed slot should be reusable");
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_dispatch_reaches_every_observer() {
    let registry = CallbackRegistry::new();
    let received = Arc::new(Mutex::new(Vec::new()));

    for id in 0..3 {
        let received = Arc::clone(&received);
        registry
            .register(Arc::new(move |event: &LogEvent| {
                received.lock().unwrap().push((id, event.clone()));
            }))
            .unwrap();
    }

    assert_eq!(registry.snapshot_and_dispatch(&event("broadcast")), 3);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|(_, e)| *e == event("broadcast")));
}

#[test]
fn test_observer_may_mutate_registry_during_dispatch() {
    // Observers run without the registry lock, so this must not deadlock
    let registry = Arc::new(CallbackRegistry::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let late = counting_observer(&counter);

    let registry_clone = Arc::clone(&registry);
    let late_clone = Arc::clone(&late);
    registry
        .register(Arc::new(move |_: &LogEvent| {
            let _ = registry_clone.register(Arc::clone(&late_clone));
        }))
        .unwrap();

    // The late observer is not part of the snapshot being dispatched
    assert_eq!(registry.snapshot_and_dispatch(&event("first")), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(registry.contains(&late));

    registry.snapshot_and_dispatch(&event("second"));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clear_removes_everything() {
    let registry = CallbackRegistry::new();
    let counter = Arc::new(AtomicUsize::new(0));
    registry.register(counting_observer(&counter)).unwrap();
    registry.register(counting_observer(&counter)).unwrap();

    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.snapshot_and_dispatch(&event("nobody")), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
