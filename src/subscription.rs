//! Local listener registry with reference counting.
//!
//! The registry tracks, per event name, an ordered set of listeners. The
//! reference count is the set size: the client sends a remote SUBSCRIBE only
//! on the 0→1 transition and a remote UNSUBSCRIBE only on 1→0; intermediate
//! transitions touch nothing on the wire.
//!
//! Remote errors that carry no nonce go to a separate error channel rather
//! than any event listener set.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::identifiers::ListenerId;
use crate::protocol::ErrorData;
use crate::schema::{EventData, EventName};

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with each validated event payload.
pub type EventListener = Arc<dyn Fn(&EventData) + Send + Sync>;

/// Callback invoked with each broadcast (nonce-less) remote error.
pub type ErrorListener = Arc<dyn Fn(&ErrorData) + Send + Sync>;

/// Outcome of adding a listener.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// Handle for later removal.
    pub id: ListenerId,
    /// Whether this was the 0→1 transition for the event.
    pub first_for_event: bool,
}

/// Outcome of removing a listener.
#[derive(Debug, Clone, Copy)]
pub struct Removal {
    /// Whether this was the 1→0 transition for the event.
    pub last_for_event: bool,
}

// ============================================================================
// SubscriptionRegistry
// ============================================================================

/// Per-event listener sets plus the broadcast error channel.
///
/// # Thread Safety
///
/// Listener sets are snapshotted before dispatch; callbacks run with no
/// internal lock held, so a listener may freely add or remove listeners.
#[derive(Default)]
pub struct SubscriptionRegistry {
    listeners: Mutex<FxHashMap<EventName, Vec<(ListenerId, EventListener)>>>,
    error_listeners: Mutex<Vec<(ListenerId, ErrorListener)>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `evt`, preserving registration order.
    pub fn add(&self, evt: EventName, listener: EventListener) -> Registration {
        let id = ListenerId::next();
        let mut listeners = self.listeners.lock();
        let set = listeners.entry(evt).or_default();
        set.push((id, listener));
        let first = set.len() == 1;
        trace!(event = %evt, listener = %id, count = set.len(), "listener added");
        Registration {
            id,
            first_for_event: first,
        }
    }

    /// Removes the listener registered under `id` for `evt`.
    ///
    /// Returns `None` when no such registration exists.
    pub fn remove(&self, evt: EventName, id: ListenerId) -> Option<Removal> {
        let mut listeners = self.listeners.lock();
        let set = listeners.get_mut(&evt)?;
        let index = set.iter().position(|(lid, _)| *lid == id)?;
        set.remove(index);
        let last = set.is_empty();
        if last {
            listeners.remove(&evt);
        }
        trace!(event = %evt, listener = %id, "listener removed");
        Some(Removal {
            last_for_event: last,
        })
    }

    /// Whether `id` is currently registered for `evt`.
    #[must_use]
    pub fn contains(&self, evt: EventName, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .get(&evt)
            .is_some_and(|set| set.iter().any(|(lid, _)| *lid == id))
    }

    /// Number of listeners registered for `evt`.
    #[must_use]
    pub fn count(&self, evt: EventName) -> usize {
        self.listeners.lock().get(&evt).map_or(0, Vec::len)
    }

    /// Delivers an event to every listener for its name, in registration
    /// order. Returns the number of listeners notified.
    pub fn dispatch(&self, event: &EventData) -> usize {
        let snapshot: Vec<EventListener> = {
            let listeners = self.listeners.lock();
            listeners
                .get(&event.name())
                .map(|set| set.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    /// Adds a listener to the broadcast error channel.
    pub fn add_error_listener(&self, listener: ErrorListener) -> ListenerId {
        let id = ListenerId::next();
        self.error_listeners.lock().push((id, listener));
        id
    }

    /// Removes a broadcast error listener. Returns `false` if unknown.
    pub fn remove_error_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.error_listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Broadcasts a nonce-less remote error. Returns listeners notified.
    pub fn dispatch_error(&self, error: &ErrorData) -> usize {
        let snapshot: Vec<ErrorListener> = self
            .error_listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &snapshot {
            listener(error);
        }
        snapshot.len()
    }

    /// Drops every listener. Teardown only.
    pub fn clear(&self) {
        self.listeners.lock().clear();
        self.error_listeners.lock().clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::schema::events::SpeakingData;

    fn speaking(user_id: &str) -> EventData {
        EventData::SpeakingStart(SpeakingData {
            user_id: user_id.to_string(),
        })
    }

    #[test]
    fn test_ref_count_transitions() {
        let registry = SubscriptionRegistry::new();

        let a = registry.add(EventName::SpeakingStart, Arc::new(|_| {}));
        assert!(a.first_for_event);
        let b = registry.add(EventName::SpeakingStart, Arc::new(|_| {}));
        assert!(!b.first_for_event);
        assert_eq!(registry.count(EventName::SpeakingStart), 2);

        let removal = registry
            .remove(EventName::SpeakingStart, a.id)
            .expect("registered");
        assert!(!removal.last_for_event);
        let removal = registry
            .remove(EventName::SpeakingStart, b.id)
            .expect("registered");
        assert!(removal.last_for_event);
        assert_eq!(registry.count(EventName::SpeakingStart), 0);
    }

    #[test]
    fn test_remove_unknown_listener() {
        let registry = SubscriptionRegistry::new();
        let reg = registry.add(EventName::SpeakingStart, Arc::new(|_| {}));
        // Wrong event name for a valid id.
        assert!(registry.remove(EventName::SpeakingStop, reg.id).is_none());
        // Valid removal, then a duplicate.
        assert!(registry.remove(EventName::SpeakingStart, reg.id).is_some());
        assert!(registry.remove(EventName::SpeakingStart, reg.id).is_none());
    }

    #[test]
    fn test_dispatch_order_and_isolation() {
        let registry = SubscriptionRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            registry.add(
                EventName::SpeakingStart,
                Arc::new(move |_| order.lock().push(tag)),
            );
        }
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            registry.add(
                EventName::SpeakingStop,
                Arc::new(move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        assert_eq!(registry.dispatch(&speaking("u1")), 2);
        assert_eq!(*order.lock(), vec!["first", "second"]);
        // Listeners for other events are untouched.
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_mutate_registry_during_dispatch() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let registry_inner = Arc::clone(&registry);

        let reg = registry.add(
            EventName::SpeakingStart,
            Arc::new(move |_| {
                registry_inner.add(EventName::SpeakingStop, Arc::new(|_| {}));
            }),
        );
        assert_eq!(registry.dispatch(&speaking("u1")), 1);
        assert_eq!(registry.count(EventName::SpeakingStop), 1);
        registry.remove(EventName::SpeakingStart, reg.id);
    }

    #[test]
    fn test_error_channel() {
        let registry = SubscriptionRegistry::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let id = {
            let seen = Arc::clone(&seen);
            registry.add_error_listener(Arc::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }))
        };

        let error = ErrorData {
            code: crate::protocol::RpcErrorCode::InvalidPermissions,
            message: Some("denied".to_string()),
        };
        assert_eq!(registry.dispatch_error(&error), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(registry.remove_error_listener(id));
        assert!(!registry.remove_error_listener(id));
        assert_eq!(registry.dispatch_error(&error), 0);
    }
}
