//! Configuration Module
//!
//! Cache-wide settings: the default TTL and the janitor's sweep interval.

use std::env;
use std::time::Duration;

/// Cache configuration.
///
/// Values can be set through the builder methods or loaded from environment
/// variables; the defaults are a cache with no default TTL and a 60-second
/// sweep interval.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL substituted when a write requests `Expiration::Default`;
    /// `None` means such entries never expire
    pub default_ttl: Option<Duration>,
    /// Janitor sweep period; `None` disables the background sweep entirely
    /// (lazy expiration on read still applies)
    pub cleanup_interval: Option<Duration>,
}

impl Config {
    /// Creates a config with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache-wide default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Sets the janitor's sweep interval. A zero interval disables the
    /// janitor, same as [`Config::without_janitor`].
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Disables the background janitor; expired entries are then reclaimed
    /// only by manual `delete_expired` calls.
    pub fn without_janitor(mut self) -> Self {
        self.cleanup_interval = None;
        self
    }

    /// Creates a Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds; 0 means entries
    ///   written with the default expiration never expire (default: 0)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep period in seconds; 0 disables
    ///   the janitor (default: 60)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&secs: &u64| secs > 0)
                .map(Duration::from_secs),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(Some(Duration::from_secs(60)), |secs: u64| {
                    (secs > 0).then(|| Duration::from_secs(secs))
                }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: None,
            cleanup_interval: Some(Duration::from_secs(60)),
        }
    }
}
