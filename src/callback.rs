//! Generic multi-subscriber callback registry.
//!
//! The native SDK offers exactly one listener slot per event kind;
//! [`CallbackManager`] widens that into a keyed registry so any number of
//! application listeners can observe the same event stream.

use crate::error::SensorError;
use crate::Result;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Opaque handle returned by [`CallbackManager::subscribe`], used to remove
/// the listener later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// The registry id behind this handle.
    pub fn id(&self) -> u64 {
        self.0
    }
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Thread-safe registry mapping subscriber ids to listener functions, with
/// a dispatch entry point that fans one event out to every listener.
///
/// One mutex guards the registry. Dispatch snapshots the listener set under
/// the lock and invokes the listeners after releasing it, so a listener may
/// safely subscribe or unsubscribe on the same manager from inside its own
/// invocation. A listener registered while a dispatch is in flight is not
/// guaranteed to see that event.
pub struct CallbackManager<E> {
    listeners: Mutex<BTreeMap<u64, Listener<E>>>,
    next_id: AtomicU64,
}

impl<E> CallbackManager<E> {
    pub fn new() -> CallbackManager<E> {
        CallbackManager {
            listeners: Mutex::new(BTreeMap::new()),
            // Leave id 0 unused so handles are always nonzero.
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener under a freshly allocated id.
    ///
    /// Allocated ids never collide, including with ids passed to
    /// [`listen`](Self::listen) explicitly.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> ListenerHandle {
        let listener: Listener<E> = Arc::new(listener);
        let mut listeners = self.listeners.lock().unwrap();
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if let std::collections::btree_map::Entry::Vacant(entry) = listeners.entry(id) {
                entry.insert(listener);
                return ListenerHandle(id);
            }
        }
    }

    /// Remove a previously subscribed listener. Removing a handle that is
    /// no longer registered is a no-op.
    pub fn unsubscribe(&self, handle: ListenerHandle) {
        self.unlisten(handle.0);
    }

    /// Register a listener under a caller-chosen id.
    ///
    /// Fails with [`SensorError::DuplicateListener`] when the id is already
    /// taken; the existing registration is left untouched.
    pub fn listen(&self, id: u64, listener: impl Fn(&E) + Send + Sync + 'static) -> Result<()> {
        let mut listeners = self.listeners.lock().unwrap();
        match listeners.entry(id) {
            std::collections::btree_map::Entry::Occupied(_) => {
                Err(SensorError::DuplicateListener(id))
            }
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(Arc::new(listener));
                Ok(())
            }
        }
    }

    /// Remove the listener with the given id. Removing an absent id is a
    /// no-op.
    pub fn unlisten(&self, id: u64) {
        self.listeners.lock().unwrap().remove(&id);
    }

    /// Number of currently registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().unwrap().is_empty()
    }

    /// Fan one event out to every registered listener.
    ///
    /// Invoked by the native-slot adapter when the SDK delivers an event;
    /// application code has no reason to call this directly. Every listener
    /// present in the snapshot is invoked even if an earlier one panics:
    /// the panic is caught, logged, and the fan-out continues.
    pub fn dispatch(&self, event: &E) {
        let snapshot: Vec<(u64, Listener<E>)> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .iter()
                .map(|(id, listener)| (*id, Arc::clone(listener)))
                .collect()
        };

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                log::error!("listener {} panicked during dispatch; continuing fan-out", id);
            }
        }
    }
}

impl<E> Default for CallbackManager<E> {
    fn default() -> Self {
        CallbackManager::new()
    }
}
