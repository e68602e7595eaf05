//! Expiring JSON cache over a key-value store
//! Entries are `{ data, expiry }` with expiry in epoch milliseconds and are
//! only evicted when read after they expire.

use crate::db::KeyValueStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Release metadata lifetime
pub const RELEASE_TTL: Duration = Duration::from_secs(60 * 60);
/// Resolved cover URL lifetime
pub const COVER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache entry with expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub expiry: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            data,
            expiry: now.timestamp_millis().saturating_add(ttl_ms),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expiry
    }
}

/// Shared handle to an expiring cache. Clones see the same store.
pub struct ExpiringCache<S> {
    store: Arc<S>,
}

impl<S> Clone for ExpiringCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> ExpiringCache<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    /// Reads `key` as of `now`. Expired or unreadable entries are removed and
    /// read as a miss.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("Cache read failed for {key}: {err}");
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Dropping unreadable cache entry {key}: {err}");
                self.evict(key);
                return None;
            }
        };

        if entry.is_expired_at(now) {
            tracing::debug!("Cache entry {key} expired");
            self.evict(key);
            return None;
        }

        Some(entry.data)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.set_at(key, value, ttl, Utc::now())
    }

    pub fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = CacheEntry::new(value, now, ttl);
        let raw = serde_json::to_string(&entry)?;
        self.store.set_item(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove_item(key)
    }

    fn evict(&self, key: &str) {
        if let Err(err) = self.store.remove_item(key) {
            tracing::warn!("Failed to evict cache entry {key}: {err}");
        }
    }
}

/// Cache key generation utilities
pub mod keys {
    pub fn release(release_id: &str) -> String {
        format!("release_{release_id}")
    }

    pub fn cover(release_id: &str) -> String {
        format!("cover_{release_id}")
    }
}
