//! Janitor Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::CacheInner;

/// Spawns the janitor for one cache instance.
///
/// The task ticks on a fixed interval and drives the same sweep path
/// callers can invoke manually; each reclaimed batch fires the cache's
/// expiration listeners. It exits when the shutdown signal is raised or
/// when every cache handle has been dropped. It holds only a weak
/// reference, so the janitor never keeps a cache alive on its own.
///
/// # Arguments
/// * `cache` - Weak reference to the shared cache state
/// * `interval` - Sweep period; must be non-zero (the caller guards this)
/// * `shutdown_rx` - Receiver for the idempotent stop signal
pub(crate) fn spawn_janitor<V>(
    cache: Weak<CacheInner<V>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!(interval_ms = interval.as_millis() as u64, "janitor started");

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; wait a full interval instead
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(cache) = cache.upgrade() else {
                        break;
                    };
                    let removed = cache.sweep();
                    if removed > 0 {
                        debug!(removed, "janitor swept expired entries");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // An error means the cache (and its sender) is gone
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("janitor stopped");
    })
}
