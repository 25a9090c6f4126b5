//! TTL cache of fetched catalogs on top of a [`CacheStore`].
//!
//! Entries are JSON envelopes `{ data, timestamp, ttl }` stored under
//! `csv_cache_<url>`. An entry is fresh while `now - timestamp <= ttl`.
//! Storage failures never reach callers: they are logged and treated as a
//! miss (reads) or dropped (writes).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::CacheStore;

/// Lifetime of a cached catalog, in milliseconds.
pub const CACHE_TTL_MS: i64 = 300_000;

/// Prefix shared by every catalog cache key.
pub const CACHE_KEY_PREFIX: &str = "csv_cache_";

/// Storage key for the catalog published at `url`.
#[must_use]
pub fn cache_key(url: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{url}")
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    /// Write time, Unix epoch milliseconds.
    timestamp: i64,
    /// Lifetime, milliseconds.
    ttl: i64,
}

/// Result of [`PersistedCache::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Fresh(T),
    /// The entry had outlived its TTL. It has already been removed from
    /// storage; the data is handed back for offline fallback only.
    Expired(T),
    Missing,
}

impl<T> CacheLookup<T> {
    /// Data regardless of freshness.
    pub fn into_any(self) -> Option<T> {
        match self {
            CacheLookup::Fresh(data) | CacheLookup::Expired(data) => Some(data),
            CacheLookup::Missing => None,
        }
    }
}

/// Typed, TTL-aware view over a [`CacheStore`].
pub struct PersistedCache<S> {
    store: S,
    now: fn() -> i64,
}

fn system_now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl<S: CacheStore> PersistedCache<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_now_ms)
    }

    /// Uses `now` (epoch milliseconds) instead of the system clock.
    #[must_use]
    pub fn with_clock(store: S, now: fn() -> i64) -> Self {
        Self { store, now }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores `data` under `key` with the given TTL, overwriting any
    /// existing entry.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl_ms: i64) {
        let entry = CacheEntry {
            data,
            timestamp: (self.now)(),
            ttl: ttl_ms,
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set_item(key, &json) {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }

    /// Returns the data under `key` if the entry is still fresh.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key) {
            CacheLookup::Fresh(data) => Some(data),
            CacheLookup::Expired(_) | CacheLookup::Missing => None,
        }
    }

    /// Reads `key`, removing it from storage if it has expired or cannot be
    /// read or decoded.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::Missing,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read cache entry, discarding it");
                self.clear(key);
                return CacheLookup::Missing;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt cache entry");
                self.clear(key);
                return CacheLookup::Missing;
            }
        };

        let age = (self.now)().saturating_sub(entry.timestamp);
        if age > entry.ttl {
            tracing::debug!(key, age_ms = age, ttl_ms = entry.ttl, "cache entry expired");
            self.clear(key);
            return CacheLookup::Expired(entry.data);
        }

        CacheLookup::Fresh(entry.data)
    }

    /// Removes `key`.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.store.remove_item(key) {
            tracing::warn!(key, error = %e, "failed to remove cache entry");
        }
    }

    /// Removes every catalog entry (keys starting with [`CACHE_KEY_PREFIX`]).
    /// Returns how many keys were removed.
    pub fn clear_product_cache(&self) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache keys");
                return 0;
            }
        };
        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(CACHE_KEY_PREFIX)) {
            match self.store.remove_item(key) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(key = %key, error = %e, "failed to remove cache entry"),
            }
        }
        removed
    }
}
