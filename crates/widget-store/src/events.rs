//! Lifecycle notifications raised by live documents.
//!
//! Listeners are called synchronously, on the thread that changed the
//! session, once the change is visible. The store never holds one of its own
//! locks while it notifies, so a listener may query the session it is
//! subscribed to. Subscriptions hold listeners weakly: dropping the last
//! strong reference ends the subscription.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Whether an event precedes or follows the state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPhase {
    /// Raised before the change is applied.
    Pre,
    /// Raised once the change is visible.
    Post,
}

/// What changed on the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The dirty flag flipped, typically because the document was saved.
    DirtyState,
    /// The editing session now holds a different document.
    DocumentReplaced,
}

/// A single lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifecycleEvent {
    /// Timing relative to the change.
    pub phase: EventPhase,
    /// Kind of change.
    pub kind: EventKind,
}

impl LifecycleEvent {
    /// Event raised before `kind` happens.
    #[must_use]
    pub const fn pre(kind: EventKind) -> Self {
        Self {
            phase: EventPhase::Pre,
            kind,
        }
    }

    /// Event raised after `kind` happened.
    #[must_use]
    pub const fn post(kind: EventKind) -> Self {
        Self {
            phase: EventPhase::Post,
            kind,
        }
    }

    /// Whether the change has already been applied.
    #[must_use]
    pub const fn is_post(self) -> bool {
        matches!(self.phase, EventPhase::Post)
    }
}

/// Receives lifecycle events of a live document.
pub trait LifecycleListener: Send + Sync {
    /// Called for every event raised after the listener subscribed.
    fn on_event(&self, event: LifecycleEvent);
}

impl<F> LifecycleListener for F
where
    F: Fn(LifecycleEvent) + Send + Sync,
{
    fn on_event(&self, event: LifecycleEvent) {
        self(event);
    }
}

/// Identifies a subscription so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Registration = (SubscriptionId, Weak<dyn LifecycleListener>);

/// Fan-out list of weakly held listeners.
#[derive(Default)]
pub struct Subscribers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Registration>>,
}

impl Subscribers {
    /// Registers `listener`.
    #[must_use]
    pub fn subscribe(&self, listener: Weak<dyn LifecycleListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    /// Cancels a subscription. Unknown identifiers are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().retain(|(registered, _)| *registered != id);
    }

    /// Delivers `event` to every listener that is still alive.
    ///
    /// Dropped listeners are pruned first. The list lock is released before
    /// any listener runs, so a listener may unsubscribe from inside
    /// [`LifecycleListener::on_event`].
    pub fn emit(&self, event: LifecycleEvent) {
        let alive: Vec<Arc<dyn LifecycleListener>> = {
            let mut listeners = self.lock();
            listeners.retain(|(_, listener)| listener.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|(_, listener)| listener.upgrade())
                .collect()
        };
        for listener in alive {
            listener.on_event(event);
        }
    }

    /// Number of registered listeners, including ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Subscribers")
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}
