//! Notification Registry Module
//!
//! Ordered listener lists for put, remove, and expiration events.

use std::sync::Arc;

use parking_lot::RwLock;

/// A registered event listener; receives the key and the value involved.
pub type Listener<V> = Arc<dyn Fn(&str, &V) + Send + Sync + 'static>;

// == Listener Registry ==
/// Three independent, append-only listener lists, one per event class.
///
/// Listeners are invoked in registration order. Dispatch snapshots the list
/// first and calls the listeners with no lock held, so a listener may freely
/// call back into the cache (including registering further listeners).
pub(crate) struct ListenerRegistry<V> {
    on_put: RwLock<Vec<Listener<V>>>,
    on_remove: RwLock<Vec<Listener<V>>>,
    on_expire: RwLock<Vec<Listener<V>>>,
}

impl<V> ListenerRegistry<V> {
    pub(crate) fn new() -> Self {
        Self {
            on_put: RwLock::new(Vec::new()),
            on_remove: RwLock::new(Vec::new()),
            on_expire: RwLock::new(Vec::new()),
        }
    }

    // == Registration ==
    pub(crate) fn add_put(&self, listener: Listener<V>) {
        self.on_put.write().push(listener);
    }

    pub(crate) fn add_remove(&self, listener: Listener<V>) {
        self.on_remove.write().push(listener);
    }

    pub(crate) fn add_expire(&self, listener: Listener<V>) {
        self.on_expire.write().push(listener);
    }

    // == Dispatch ==
    pub(crate) fn notify_put(&self, key: &str, value: &V) {
        Self::notify(&self.on_put, key, value);
    }

    pub(crate) fn notify_remove(&self, key: &str, value: &V) {
        Self::notify(&self.on_remove, key, value);
    }

    pub(crate) fn notify_expire(&self, key: &str, value: &V) {
        Self::notify(&self.on_expire, key, value);
    }

    fn notify(list: &RwLock<Vec<Listener<V>>>, key: &str, value: &V) {
        let listeners = {
            let guard = list.read();
            if guard.is_empty() {
                return;
            }
            guard.clone()
        };

        for listener in &listeners {
            listener(key, value);
        }
    }
}
