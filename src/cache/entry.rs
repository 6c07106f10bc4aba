//! Cache Entry Module
//!
//! Defines the expiration vocabulary and the stored entry for one key.

use std::time::{Duration, Instant};

// == Expiration Request ==
/// Per-write expiration request, accepted by every write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// The entry never expires.
    Never,
    /// Substitute the cache-wide default TTL configured at construction.
    /// If the cache has no default, the entry never expires.
    Default,
    /// Expire after the given duration. `Duration::ZERO` inserts an
    /// already-expired entry, which only the sweep will reclaim.
    After(Duration),
}

// == Stored Expiry ==
/// Absolute expiration state of a stored entry, fixed at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No expiration instant; the entry lives until removed.
    Never,
    /// The entry is expired once the current time reaches this instant.
    At(Instant),
}

// == Time To Live ==
/// Caller-actionable report of an entry's remaining lifetime.
///
/// Unlike [`Expiry`], which reports raw stored state, this resolves the
/// entry against the current time and uses explicit terminal sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeToLive {
    /// The entry has no expiration.
    Never,
    /// The entry's expiration instant has already passed.
    Expired,
    /// Time remaining until the entry expires.
    Remaining(Duration),
}

// == Cache Entry ==
/// A single stored entry: the value plus its expiration state.
///
/// Entries are immutable once created; re-putting a key replaces the entry
/// wholesale with a freshly computed expiration.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub(crate) value: V,
    /// Expiration state, resolved at insertion
    pub(crate) expiry: Expiry,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry, resolving the expiration request against the
    /// cache-wide default TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expiration` - The caller's expiration request
    /// * `default_ttl` - The cache-wide default, substituted for
    ///   [`Expiration::Default`] (`None` means no default is configured)
    pub(crate) fn new(value: V, expiration: Expiration, default_ttl: Option<Duration>) -> Self {
        let expiry = match expiration {
            Expiration::Never => Expiry::Never,
            Expiration::Default => match default_ttl {
                Some(ttl) => Expiry::after(ttl),
                None => Expiry::Never,
            },
            Expiration::After(ttl) => Expiry::after(ttl),
        };

        Self { value, expiry }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to its expiration instant, so a zero-duration
    /// TTL produces an entry that is expired from the moment it is stored.
    pub(crate) fn is_expired(&self) -> bool {
        match self.expiry {
            Expiry::Never => false,
            Expiry::At(at) => Instant::now() >= at,
        }
    }

    // == Time To Live ==
    /// Resolves the entry's remaining lifetime against the current time.
    pub(crate) fn time_to_live(&self) -> TimeToLive {
        match self.expiry {
            Expiry::Never => TimeToLive::Never,
            Expiry::At(at) => {
                let now = Instant::now();
                if now >= at {
                    TimeToLive::Expired
                } else {
                    TimeToLive::Remaining(at - now)
                }
            }
        }
    }
}

impl Expiry {
    /// Computes an absolute expiry `ttl` from now. A TTL too large to
    /// represent as an `Instant` degrades to `Never`.
    fn after(ttl: Duration) -> Self {
        match Instant::now().checked_add(ttl) {
            Some(at) => Expiry::At(at),
            None => Expiry::Never,
        }
    }
}
