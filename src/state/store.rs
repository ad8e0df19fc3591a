use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use super::{ConnectionId, ConnectionState};

/// Shared handle to one connection's state.
pub type SharedState = Arc<Mutex<ConnectionState>>;

/// Registry of connection states.
///
/// At most one state exists per identity. Entries are created lazily
/// and only go away through [`remove`](Self::remove), there is no eviction.
#[derive(Debug, Default)]
pub struct ConnectionStateStore {
    states: DashMap<ConnectionId, SharedState>,
    next_id: AtomicU64,
}

impl ConnectionStateStore {
    pub fn new() -> Self { Self::default() }

    /// Allocate a fresh identity with an empty state.
    pub fn open(&self) -> ConnectionId {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.state(id);
        id
    }

    /// State of `id`, created if absent.
    pub fn state(&self, id: ConnectionId) -> SharedState {
        self.states
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(ConnectionState::new(id))))
            .value()
            .clone()
    }

    /// State of `id`, if present.
    pub fn get(&self, id: ConnectionId) -> Option<SharedState> {
        self.states.get(&id).map(|s| s.value().clone())
    }

    /// Drop the state of `id`, together with its inflater and buffers.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let removed = self.states.remove(&id).is_some();
        if removed {
            log::debug!("connection {}: state removed", id);
        }
        removed
    }

    #[inline]
    pub fn contains(&self, id: ConnectionId) -> bool { self.states.contains_key(&id) }

    #[inline]
    pub fn len(&self) -> usize { self.states.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// Open a new connection and hold its state until the lease drops.
    pub fn lease(self: &Arc<Self>) -> StateLease {
        let id = self.open();
        let state = self.state(id);
        StateLease {
            store: self.clone(),
            id,
            state,
        }
    }
}

/// Owns a store entry. Dropping the lease removes the entry.
#[derive(Debug)]
pub struct StateLease {
    store: Arc<ConnectionStateStore>,
    id: ConnectionId,
    state: SharedState,
}

impl StateLease {
    #[inline]
    pub const fn id(&self) -> ConnectionId { self.id }

    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, ConnectionState> { self.state.lock() }

    #[inline]
    pub fn shared(&self) -> &SharedState { &self.state }
}

impl Drop for StateLease {
    fn drop(&mut self) { self.store.remove(self.id); }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn one_state_per_id() {
        let store = ConnectionStateStore::new();
        let id = ConnectionId::new(42);

        let a = store.state(id);
        let b = store.state(id);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        a.lock().enable_gzip();
        assert!(b.lock().gzip_enabled());

        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.get(id).is_none());

        // recreated fresh after removal
        assert!(!store.state(id).lock().gzip_enabled());
    }

    #[test]
    fn concurrent_access() {
        let store = Arc::new(ConnectionStateStore::new());
        let id = ConnectionId::new(1);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.state(id).lock().append_fragment(b"x");
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.state(id).lock().fragment().len(), 800);
    }

    #[test]
    fn lease_removes_on_drop() {
        let store = Arc::new(ConnectionStateStore::new());

        let lease = store.lease();
        let id = lease.id();
        let other = store.open();
        assert_ne!(id, other);
        assert!(store.contains(id));

        lease.lock().add_cookie("k=v");
        assert_eq!(store.state(id).lock().cookie_jar(), "Cookie: k=v; ");

        drop(lease);
        assert!(!store.contains(id));
        assert!(store.contains(other));
    }
}
