//! Two-level cache of timestamped values.
//!
//! Entries live in an in-memory map mirrored to the persistent
//! [`KeyValueStore`] under `cache_<key>`. A read checks memory first and
//! falls back to the store; a write always updates memory and then tries
//! the store. The memory map's lock is never held across an `.await`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use safe_zone_database::{DbError, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Prefix of every persistent cache key.
pub const CACHE_PREFIX: &str = "cache_";

/// A cached value and the Unix-millisecond time it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached value.
    pub data: T,
    /// Write time in Unix milliseconds.
    pub timestamp: i64,
}

/// Storage key of a logical cache key.
#[must_use]
pub fn storage_key(key: &str) -> String {
    format!("{CACHE_PREFIX}{key}")
}

/// Timestamped read-through/write-through cache.
pub struct CacheStore {
    memory: Mutex<BTreeMap<String, CacheEntry<serde_json::Value>>>,
    last_update: Mutex<Option<i64>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Creates a cache over `store`. Entries older than `ttl` are stale.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            memory: Mutex::new(BTreeMap::new()),
            last_update: Mutex::new(None),
            store,
            clock,
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Returns `true` if an entry written at `timestamp` is still fresh.
    #[must_use]
    pub fn is_fresh(&self, timestamp: i64) -> bool {
        self.clock.now_millis().saturating_sub(timestamp) < self.ttl_millis
    }

    /// Returns the value under `key` if it exists and is fresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entry(key).await?;
        if !self.is_fresh(entry.timestamp) {
            log::debug!("cache stale: {key}");
            return None;
        }
        log::debug!("cache hit: {key}");
        decode(key, entry.data)
    }

    /// Returns the value under `key` regardless of its age.
    pub async fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entry(key).await?;
        decode(key, entry.data)
    }

    /// Stores `data` under `key` with the current time.
    ///
    /// Memory is always updated. A persistent-store failure is logged and
    /// otherwise ignored.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, data: &T) {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                log::error!("cache set {key}: cannot serialize value: {e}");
                return;
            }
        };
        let entry = CacheEntry {
            data: value,
            timestamp: self.clock.now_millis(),
        };

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), entry.clone());
        }
        if let Ok(mut last_update) = self.last_update.lock() {
            *last_update = Some(entry.timestamp);
        }

        if let Err(e) = self.persist(key, &entry).await {
            log::warn!("cache set {key}: persistent write failed: {e}");
        }
    }

    /// Drops every entry from memory and every `cache_` key from the
    /// persistent store, and resets the freshness watermark.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the persistent store cannot be listed or a
    /// key cannot be removed. Memory is cleared regardless.
    pub async fn clear(&self) -> Result<(), DbError> {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
        if let Ok(mut last_update) = self.last_update.lock() {
            *last_update = None;
        }

        let keys = self.store.keys().await?;
        for key in keys.iter().filter(|k| k.starts_with(CACHE_PREFIX)) {
            self.store.remove(key).await?;
        }
        log::info!("cache cleared");
        Ok(())
    }

    /// Returns `true` if any cache write happened within the TTL.
    #[must_use]
    pub fn has_fresh_data(&self) -> bool {
        self.last_update
            .lock()
            .ok()
            .and_then(|last_update| *last_update)
            .is_some_and(|timestamp| self.is_fresh(timestamp))
    }

    async fn entry(&self, key: &str) -> Option<CacheEntry<serde_json::Value>> {
        let cached = self
            .memory
            .lock()
            .ok()
            .and_then(|memory| memory.get(key).cloned());
        if cached.is_some() {
            return cached;
        }

        let raw = match self.store.get(&storage_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("cache miss: {key}");
                return None;
            }
            Err(e) => {
                log::warn!("cache get {key}: persistent read failed: {e}");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw) {
            Ok(entry) => {
                if let Ok(mut memory) = self.memory.lock() {
                    memory.insert(key.to_string(), entry.clone());
                }
                Some(entry)
            }
            Err(e) => {
                log::warn!("cache get {key}: discarding corrupt entry: {e}");
                None
            }
        }
    }

    async fn persist(
        &self,
        key: &str,
        entry: &CacheEntry<serde_json::Value>,
    ) -> Result<(), DbError> {
        let raw = serde_json::to_string(entry)?;
        self.store.set(&storage_key(key), &raw).await
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("cache get {key}: value has unexpected shape: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use safe_zone_database::MemoryStore;

    use super::*;
    use crate::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(30 * 60);

    fn cache() -> (CacheStore, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let cache = CacheStore::new(store.clone(), clock.clone(), TTL);
        (cache, store, clock)
    }

    #[tokio::test]
    async fn fresh_entries_are_served_until_ttl() {
        let (cache, _, clock) = cache();
        cache.set("safeZones", &vec![1, 2, 3]).await;

        clock.advance(TimeDelta::minutes(29));
        assert_eq!(cache.get::<Vec<i32>>("safeZones").await, Some(vec![1, 2, 3]));

        clock.advance(TimeDelta::minutes(1));
        assert_eq!(cache.get::<Vec<i32>>("safeZones").await, None);
        assert_eq!(
            cache.get_stale::<Vec<i32>>("safeZones").await,
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn writes_through_to_the_store() {
        let (cache, store, clock) = cache();
        clock.advance(TimeDelta::milliseconds(1234));
        cache.set("climateAlerts", &"hello").await;

        let raw = store.get("cache_climateAlerts").await.unwrap().unwrap();
        let entry: CacheEntry<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.data, "hello");
        assert_eq!(entry.timestamp, 1234);
    }

    #[tokio::test]
    async fn reads_through_from_the_store() {
        let (cache, store, _) = cache();
        store
            .set("cache_safeZones", r#"{"data":["a"],"timestamp":0}"#)
            .await
            .unwrap();
        assert_eq!(
            cache.get::<Vec<String>>("safeZones").await,
            Some(vec!["a".to_string()])
        );
    }

    #[tokio::test]
    async fn store_failure_still_updates_memory() {
        let (cache, store, _) = cache();
        store.set_fail_writes(true);
        cache.set("safeZones", &vec![7]).await;
        assert_eq!(cache.get::<Vec<i32>>("safeZones").await, Some(vec![7]));
        assert!(cache.has_fresh_data());
    }

    #[tokio::test]
    async fn corrupt_persistent_entry_is_a_miss() {
        let (cache, store, _) = cache();
        store.set("cache_safeZones", "not json").await.unwrap();
        assert_eq!(cache.get::<Vec<i32>>("safeZones").await, None);
    }

    #[tokio::test]
    async fn fresh_data_watermark() {
        let (cache, _, clock) = cache();
        assert!(!cache.has_fresh_data());
        cache.set("safeZones", &1).await;
        assert!(cache.has_fresh_data());
        clock.advance(TimeDelta::minutes(30));
        assert!(!cache.has_fresh_data());
    }

    #[tokio::test]
    async fn clear_removes_every_cache_key_and_nothing_else() {
        let (cache, store, _) = cache();

        cache.set("safeZones", &1).await;
        cache.set("climateAlerts", &2).await;
        store.set("cache_userReports", "[]").await.unwrap();
        store.set("favoriteSafeZones", "[\"1\"]").await.unwrap();

        cache.clear().await.unwrap();

        assert!(!cache.has_fresh_data());
        assert_eq!(cache.get_stale::<i32>("safeZones").await, None);
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["favoriteSafeZones"]
        );
    }
}
