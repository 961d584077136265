//! In-memory store backed by `DashMap`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{CacheStore, OptionsStore};
use crate::core::TemplateError;

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry expiring `ttl` from now.
    #[must_use]
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            value: value.into(),
            expires_at,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Options and cache held in process memory.
///
/// Uses `DashMap` so that concurrent requests can read and write without a
/// global lock. Cloning the store is not supported; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    options: DashMap<String, String>,
    cache: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously saved contents, dropping expired cache entries.
    #[must_use]
    pub fn from_parts(
        options: BTreeMap<String, String>,
        cache: BTreeMap<String, CacheEntry>,
    ) -> Self {
        let now = Utc::now();
        let store = Self::new();
        for (name, value) in options {
            store.options.insert(name, value);
        }
        for (key, entry) in cache {
            if !entry.is_expired(now) {
                store.cache.insert(key, entry);
            }
        }
        store
    }

    /// Sorted copy of all options.
    #[must_use]
    pub fn options_snapshot(&self) -> BTreeMap<String, String> {
        self.options.iter().map(|e| (e.key().clone(), e.value().clone())).collect()
    }

    /// Sorted copy of all live cache entries.
    #[must_use]
    pub fn cache_snapshot(&self) -> BTreeMap<String, CacheEntry> {
        let now = Utc::now();
        self.cache
            .iter()
            .filter(|e| !e.value().is_expired(now))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Remove `key` only if the entry stored under it has expired at `now`.
    ///
    /// An entry rewritten since it was read is left in place.
    fn evict_if_expired(&self, key: &str, now: DateTime<Utc>) -> bool {
        let evicted = self.cache.remove_if(key, |_, entry| entry.is_expired(now)).is_some();
        if evicted {
            tracing::debug!("Evicted expired cache entry {}", key);
        }
        evicted
    }

    /// Number of cache entries currently held, expired or not.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl OptionsStore for MemoryStore {
    fn get_option(&self, name: &str) -> Option<String> {
        self.options.get(name).map(|v| v.value().clone())
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), TemplateError> {
        self.options.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<bool, TemplateError> {
        Ok(self.options.remove(name).is_some())
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        // Clone out of the shard guard before any removal to avoid deadlocking.
        let entry = self.cache.get(key).map(|e| e.value().clone())?;
        let now = Utc::now();
        if entry.is_expired(now) {
            self.evict_if_expired(key, now);
            return None;
        }
        Some(entry.value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.cache.insert(key.to_string(), CacheEntry::new(value, ttl));
    }

    fn delete(&self, key: &str) -> bool {
        self.cache.remove(key).is_some()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.cache
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect()
    }
}
