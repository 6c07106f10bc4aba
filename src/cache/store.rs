//! Cache Store Module
//!
//! The cache engine: a keyed entry map behind a single reader/writer lock,
//! with expiration-aware operations and listener dispatch outside the lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::cache::entry::CacheEntry;
use crate::cache::listeners::ListenerRegistry;
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheStats, Expiration, Expiry, TimeToLive};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_janitor;

// == Shared State ==
/// State shared between every [`Cache`] handle and the janitor task.
pub(crate) struct CacheInner<V> {
    /// Key-value storage, the sole shared mutable resource
    items: RwLock<HashMap<String, CacheEntry<V>>>,
    /// Cache-wide TTL substituted for `Expiration::Default`
    default_ttl: Option<Duration>,
    /// Put/remove/expiration listener lists
    listeners: ListenerRegistry<V>,
    /// Hit/miss/expiration counters
    stats: StatsCounters,
    /// Janitor stop signal; sending is non-blocking and repeatable
    shutdown_tx: watch::Sender<bool>,
}

// == Cache ==
/// A thread-safe in-process key/value cache with per-entry TTL expiration.
///
/// Entries past their expiration instant are invisible to every
/// value-returning read even before they are physically reclaimed (lazy
/// expiration); a background janitor periodically sweeps them out and fires
/// expiration listeners (active expiration). Handles are cheap to clone and
/// share one underlying store.
///
/// Listener callbacks always run after the internal lock has been released,
/// so a listener may call back into the cache without deadlocking.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use larder::{Cache, Config, Expiration};
///
/// #[tokio::main]
/// async fn main() {
///     let cache: Cache<String> = Cache::with_config(
///         Config::new()
///             .with_default_ttl(Duration::from_secs(300))
///             .with_cleanup_interval(Duration::from_secs(30)),
///     );
///
///     cache.put("user:1", "alice".to_string(), Expiration::Default);
///     assert_eq!(cache.get("user:1"), Some("alice".to_string()));
///
///     cache.shutdown();
/// }
/// ```
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the default configuration (no default TTL,
    /// 60-second sweep interval).
    ///
    /// # Panics
    /// Panics when the configuration enables the janitor and no tokio
    /// runtime is available; see [`Cache::with_config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a cache from the given configuration.
    ///
    /// A non-zero cleanup interval starts the per-instance janitor task.
    /// With the janitor disabled the cache still expires entries lazily on
    /// read; only the physical reclamation (and with it the expiration
    /// listeners) stops running unless [`Cache::delete_expired`] is called
    /// manually.
    ///
    /// # Panics
    /// Panics when the configuration enables the janitor and the calling
    /// context has no tokio runtime to spawn it on. Disable the janitor with
    /// [`Config::without_janitor`] to construct a cache outside a runtime.
    pub fn with_config(config: Config) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(CacheInner {
            items: RwLock::new(HashMap::new()),
            default_ttl: config.default_ttl,
            listeners: ListenerRegistry::new(),
            stats: StatsCounters::default(),
            shutdown_tx,
        });

        if let Some(interval) = config.cleanup_interval.filter(|i| !i.is_zero()) {
            if tokio::runtime::Handle::try_current().is_err() {
                panic!(
                    "larder::Cache spawns a background janitor and requires a tokio \
                     runtime; construct the cache inside one or disable the cleanup \
                     interval with Config::without_janitor()"
                );
            }
            spawn_janitor(Arc::downgrade(&inner), interval, shutdown_rx);
        }

        Self { inner }
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or its entry has expired. Expired
    /// entries are not removed here; reclamation is the sweep's job.
    pub fn get(&self, key: &str) -> Option<V> {
        let items = self.inner.items.read();
        match items.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.inner.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.inner.stats.record_miss();
                None
            }
        }
    }

    // == Try Get ==
    /// Like [`Cache::get`], but distinguishes the two failure conditions:
    /// [`CacheError::Expired`] when the key is physically present past its
    /// TTL, [`CacheError::NotFound`] otherwise.
    pub fn try_get(&self, key: &str) -> Result<V> {
        let items = self.inner.items.read();
        match items.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.inner.stats.record_hit();
                Ok(entry.value.clone())
            }
            Some(_) => {
                self.inner.stats.record_miss();
                Err(CacheError::Expired(key.to_string()))
            }
            None => {
                self.inner.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Exists ==
    /// Returns whether `key` is present and unexpired.
    pub fn exists(&self, key: &str) -> bool {
        let items = self.inner.items.read();
        items.get(key).is_some_and(|entry| !entry.is_expired())
    }

    // == Expiration ==
    /// Reports the raw stored expiration state for `key`.
    ///
    /// Found iff the key is physically present, expired or not; this is
    /// state introspection, not an existence check. Returns
    /// [`Expiry::Never`] for non-expiring entries.
    pub fn expiration(&self, key: &str) -> Option<Expiry> {
        self.inner.items.read().get(key).map(|entry| entry.expiry)
    }

    // == Time To Live ==
    /// Reports the remaining lifetime for `key`.
    ///
    /// Found iff the key is physically present. Returns
    /// [`TimeToLive::Never`] for non-expiring entries,
    /// [`TimeToLive::Expired`] for entries past their TTL, and
    /// [`TimeToLive::Remaining`] otherwise.
    pub fn time_to_live(&self, key: &str) -> Option<TimeToLive> {
        self.inner
            .items
            .read()
            .get(key)
            .map(|entry| entry.time_to_live())
    }

    // == Put ==
    /// Unconditionally stores `value` under `key`, replacing any previous
    /// entry and computing a fresh expiration.
    ///
    /// Fires the on-put listeners with the new value after the write lock
    /// has been released.
    pub fn put(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        let key = key.into();
        let entry = CacheEntry::new(value.clone(), expiration, self.inner.default_ttl);
        self.inner.items.write().insert(key.clone(), entry);
        self.inner.listeners.notify_put(&key, &value);
    }

    // == Put If Absent ==
    /// Stores `value` only if `key` is absent or expired; the check and the
    /// insert happen under one write lock, so two concurrent calls for the
    /// same key cannot both insert.
    ///
    /// Returns whether the value was stored; fires on-put listeners on
    /// success.
    pub fn put_if_absent(&self, key: impl Into<String>, value: V, expiration: Expiration) -> bool {
        let key = key.into();
        {
            let mut items = self.inner.items.write();
            let occupied = items.get(&key).is_some_and(|entry| !entry.is_expired());
            if occupied {
                return false;
            }
            let entry = CacheEntry::new(value.clone(), expiration, self.inner.default_ttl);
            items.insert(key.clone(), entry);
        }
        self.inner.listeners.notify_put(&key, &value);
        true
    }

    // == Put If Exists ==
    /// Mirror image of [`Cache::put_if_absent`]: stores `value` only if
    /// `key` is currently present and unexpired.
    pub fn put_if_exists(&self, key: impl Into<String>, value: V, expiration: Expiration) -> bool {
        let key = key.into();
        {
            let mut items = self.inner.items.write();
            let live = items.get(&key).is_some_and(|entry| !entry.is_expired());
            if !live {
                return false;
            }
            let entry = CacheEntry::new(value.clone(), expiration, self.inner.default_ttl);
            items.insert(key.clone(), entry);
        }
        self.inner.listeners.notify_put(&key, &value);
        true
    }

    // == Remove ==
    /// Removes `key` if it is present and unexpired, firing the on-remove
    /// listeners with the removed value.
    ///
    /// An expired-but-unswept key is already gone as far as callers are
    /// concerned: it is left for the sweep, no listener fires, and the call
    /// returns `false`.
    pub fn remove(&self, key: &str) -> bool {
        let removed = {
            let mut items = self.inner.items.write();
            let live = items.get(key).is_some_and(|entry| !entry.is_expired());
            if live {
                items.remove(key)
            } else {
                None
            }
        };

        match removed {
            Some(entry) => {
                self.inner.listeners.notify_remove(key, &entry.value);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Discards every entry in one step. This is a bulk reset: no remove or
    /// expiration listeners fire.
    pub fn clear(&self) {
        self.inner.items.write().clear();
    }

    // == Delete Expired ==
    /// Removes every expired entry and fires one on-expire listener
    /// invocation per removed entry, in the order collected.
    ///
    /// The janitor drives this periodically; callers may also invoke it
    /// manually. Returns the number of entries removed.
    pub fn delete_expired(&self) -> usize {
        self.inner.sweep()
    }

    // == Count ==
    /// Number of physically present entries.
    ///
    /// Expired-but-unswept entries are included: this is the raw size of the
    /// store, not a live-key count. Use [`Cache::keys`] for the live view.
    pub fn count(&self) -> usize {
        self.inner.items.read().len()
    }

    // == Is Empty ==
    /// Returns true if no entries are physically present.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // == Keys ==
    /// Returns the keys of all unexpired entries, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .items
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Values ==
    /// Returns copies of all unexpired values, in no particular order.
    pub fn values(&self) -> Vec<V> {
        self.inner
            .items
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(_, entry)| entry.value.clone())
            .collect()
    }

    // == For Each ==
    /// Visits every unexpired key/value pair; the visitor returns `false`
    /// to stop early.
    ///
    /// The live pairs are snapshotted under the read lock before the first
    /// visit, so the visitor runs with no lock held: it may mutate the cache
    /// freely, and such mutation is never reflected in the ongoing
    /// iteration.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        let snapshot: Vec<(String, V)> = {
            let items = self.inner.items.read();
            items
                .iter()
                .filter(|(_, entry)| !entry.is_expired())
                .map(|(key, entry)| (key.clone(), entry.value.clone()))
                .collect()
        };

        for (key, value) in &snapshot {
            if !visitor(key, value) {
                break;
            }
        }
    }

    // == Listener Registration ==
    /// Registers a listener fired after every successful put, with the key
    /// and the newly stored value. Listeners cannot be unregistered.
    pub fn add_put_listener<F>(&self, listener: F)
    where
        F: Fn(&str, &V) + Send + Sync + 'static,
    {
        self.inner.listeners.add_put(Arc::new(listener));
    }

    /// Registers a listener fired after every successful [`Cache::remove`],
    /// with the key and the removed value.
    pub fn add_remove_listener<F>(&self, listener: F)
    where
        F: Fn(&str, &V) + Send + Sync + 'static,
    {
        self.inner.listeners.add_remove(Arc::new(listener));
    }

    /// Registers a listener fired once per entry reclaimed by an expiration
    /// sweep, with the key and the value that was stored.
    pub fn add_expiration_listener<F>(&self, listener: F)
    where
        F: Fn(&str, &V) + Send + Sync + 'static,
    {
        self.inner.listeners.add_expire(Arc::new(listener));
    }

    // == Stats ==
    /// Returns a snapshot of the cache's performance counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.count())
    }

    /// Test-only view of the shared state, for janitor lifecycle tests.
    #[cfg(test)]
    pub(crate) fn inner_handle(&self) -> &Arc<CacheInner<V>> {
        &self.inner
    }

    // == Shutdown ==
    /// Stops the background janitor.
    ///
    /// Safe to call any number of times, from any handle, before or after
    /// the janitor has already exited; the signal never blocks. The cache
    /// itself remains fully usable afterwards, with lazy expiration only.
    /// Dropping the last handle stops the janitor as well.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
    }
}

impl<V> Default for Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheInner<V> {
    // == Sweep ==
    /// Collects and deletes every expired entry under one write lock, then
    /// fires the expiration listeners outside it. Shared by the janitor and
    /// [`Cache::delete_expired`].
    pub(crate) fn sweep(&self) -> usize {
        let expired: Vec<(String, V)> = {
            let mut items = self.items.write();
            let keys: Vec<String> = items
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect();
            keys.into_iter()
                .filter_map(|key| items.remove(&key).map(|entry| (key, entry.value)))
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        self.stats.record_expirations(expired.len() as u64);
        for (key, value) in &expired {
            self.listeners.notify_expire(key, value);
        }
        expired.len()
    }
}

impl<V> Drop for CacheInner<V> {
    fn drop(&mut self) {
        // Last handle gone: tell the janitor to stop
        let _ = self.shutdown_tx.send(true);
    }
}
