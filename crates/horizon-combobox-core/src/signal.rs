//! Typed notifications with closure slots.
//!
//! The combobox engine announces commits through a [`Signal`], the
//! autocomplete widget publishes its lifecycle on one, and the
//! [`Document`](crate::Document) forwards scroll requests through another.
//! Slots hold no lock while they run: `emit` snapshots the table first, so a
//! slot may connect, disconnect or emit again. A slot connected mid-emission
//! first runs on the next `emit`; one disconnected mid-emission is skipped if
//! it has not run yet.
//!
//! ```
//! use horizon_combobox_core::Signal;
//!
//! let picked = Signal::<String>::new();
//! let id = picked.connect(|value| println!("picked {value}"));
//! picked.emit("apple".to_string());
//! assert!(picked.disconnect(id));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type ConnectionTable<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// A notification carrying `Args` to every connected slot.
pub struct Signal<Args> {
    // Shared with outstanding guards so they can detach after the fact.
    connections: Arc<ConnectionTable<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.connections.lock().len())
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Attach `slot`; it stays connected until [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Attach `slot` for as long as the returned guard lives.
    ///
    /// The guard keeps only a weak handle on the table and may outlive the
    /// signal.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id: self.connect(slot),
        }
    }

    /// Detach a slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Number of attached slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Run every slot attached when the call starts.
    #[tracing::instrument(skip_all, target = "horizon_combobox_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let snapshot: Vec<(ConnectionId, Slot<Args>)> = self
            .connections
            .lock()
            .iter()
            .map(|(id, slot)| (id, slot.clone()))
            .collect();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");

        for (id, slot) in snapshot {
            if self.connections.lock().contains_key(id) {
                slot(&args);
            }
        }
    }
}

/// Detaches its slot when dropped. Returned by [`Signal::connect_scoped`].
pub struct ConnectionGuard<Args> {
    connections: Weak<ConnectionTable<Args>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> std::fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ConnectionGuard").field(&self.id).finish()
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Commit {
        identifier: String,
    }

    #[test]
    fn test_commit_payload_reaches_every_slot_in_order() {
        let committed = Signal::<Commit>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = log.clone();
            committed.connect(move |commit: &Commit| {
                log.lock().push(format!("{tag}:{}", commit.identifier));
            });
        }
        committed.emit(Commit {
            identifier: "opt-1".into(),
        });

        assert_eq!(*log.lock(), vec!["first:opt-1", "second:opt-1"]);
    }

    #[test]
    fn test_guard_detaches_only_its_own_slot() {
        let committed = Signal::<Commit>::new();
        let plain_calls = Arc::new(AtomicUsize::new(0));
        let scoped_calls = Arc::new(AtomicUsize::new(0));

        let counter = plain_calls.clone();
        let plain = committed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = scoped_calls.clone();
        let guard = committed.connect_scoped(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_ne!(guard.id(), plain);

        let commit = Commit {
            identifier: "a".into(),
        };
        committed.emit(commit.clone());
        drop(guard);
        committed.emit(commit);

        assert_eq!(plain_calls.load(Ordering::SeqCst), 2);
        assert_eq!(scoped_calls.load(Ordering::SeqCst), 1);
        assert_eq!(committed.connection_count(), 1);
        assert!(committed.disconnect(plain));
        assert!(!committed.disconnect(plain));
    }

    #[test]
    fn test_guard_dropped_after_signal() {
        let guard = {
            let signal = Signal::<()>::new();
            signal.connect_scoped(|_| {})
        };
        drop(guard);
    }

    #[test]
    fn test_slot_may_emit_and_connect_reentrantly() {
        let signal = Arc::new(Signal::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&signal);
        let counter = calls.clone();
        signal.connect(move |&depth| {
            counter.fetch_add(1, Ordering::SeqCst);
            if depth == 0
                && let Some(signal) = weak.upgrade()
            {
                signal.connect(|_| {});
                signal.emit(depth + 1);
            }
        });

        signal.emit(0);
        // The slot added during the outer emit only saw the nested one.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_slot_dropping_a_guard_mid_emit_skips_it() {
        let signal = Arc::new(Signal::<()>::new());
        let later_called = Arc::new(AtomicBool::new(false));
        let later_guard = Arc::new(Mutex::new(None::<ConnectionGuard<()>>));

        let guard_slot = later_guard.clone();
        signal.connect(move |_| {
            guard_slot.lock().take();
        });
        let flag = later_called.clone();
        *later_guard.lock() = Some(signal.connect_scoped(move |_| flag.store(true, Ordering::SeqCst)));

        signal.emit(());
        assert!(!later_called.load(Ordering::SeqCst));
        assert_eq!(signal.connection_count(), 1);
    }
}
