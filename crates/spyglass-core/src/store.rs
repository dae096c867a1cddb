//! Observable containers with cached snapshots.
//!
//! [`ObservableStore`] is the foundation every Spyglass store builds on: a
//! mutable value whose current state is exposed as a reference-stable
//! [`Arc`] snapshot, with synchronous listener notification after every
//! mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Identifier for a registered listener.
///
/// Returned by [`ObservableStore::subscribe`] and passed back to
/// [`ObservableStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

/// A mutable container with cached-snapshot-on-mutation and synchronous
/// subscriber notification.
///
/// Every mutation through [`mutate`](Self::mutate), in order: applies the
/// change, rebuilds the cached [`Arc`] snapshot, then invokes every current
/// listener. The snapshot only changes identity when the state mutates, so
/// consumers can detect change with [`Arc::ptr_eq`].
///
/// Listeners run outside the state locks against a copy of the listener
/// list; unsubscribing during a notification pass is safe and does not
/// affect the pass in progress.
pub struct ObservableStore<T> {
    state: RwLock<T>,
    snapshot: RwLock<Arc<T>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl<T: Clone> ObservableStore<T> {
    /// Create a store with an initial state.
    pub fn new(initial: T) -> Self {
        let snapshot = Arc::new(initial.clone());
        Self {
            state: RwLock::new(initial),
            snapshot: RwLock::new(snapshot),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Get the cached snapshot.
    ///
    /// The returned `Arc` is identical (pointer-equal) to the previous one
    /// unless a mutation happened in between.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.snapshot.read())
    }

    /// Read the live state without mutating or notifying.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.read())
    }

    /// Mutate the state, rebuild the snapshot, then notify all listeners.
    ///
    /// The snapshot swap happens under the state write lock, so no reader
    /// ever observes a half-updated snapshot. Listeners are invoked after
    /// the locks are released.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut state = self.state.write();
            let result = f(&mut state);
            *self.snapshot.write() = Arc::new(state.clone());
            result
        };
        self.notify();
        result
    }

    /// Register a listener invoked synchronously after every mutation.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl<T> std::fmt::Debug for ObservableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableStore")
            .field("subscriber_count", &self.listeners.read().len())
            .finish()
    }
}
