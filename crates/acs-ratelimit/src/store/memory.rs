//! In-memory `RateLimitStore`.
//!
//! ⚠️ **WARNING: Single-Process Only** ⚠️
//!
//! Suitable for development, testing, and single-instance deployments.
//! All state is local to this process and lost on restart. For a
//! multi-instance deployment use [`crate::store::distributed::RedisRateLimitStore`].
//!
//! # Thread Safety
//!
//! Backed by a [`dashmap::DashMap`]; all operations are safe to call
//! concurrently from many tasks.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use acs_types::error::Result;
use acs_types::ports::rate_limit::{RateLimitEntry, RateLimitStore, StoreStats};

/// In-memory implementation of [`RateLimitStore`].
pub struct InMemoryRateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
    total_requests: AtomicU64,
    expired_removed: AtomicU64,
    last_cleanup: std::sync::RwLock<Option<Instant>>,
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            total_requests: AtomicU64::new(0),
            expired_removed: AtomicU64::new(0),
            last_cleanup: std::sync::RwLock::new(None),
        }
    }

    fn is_expired(entry: &RateLimitEntry, now_millis: i64) -> bool {
        entry.expires_at_millis <= now_millis
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let now = chrono::Utc::now().timestamp_millis();

        match self.entries.get(key) {
            Some(entry) if !Self::is_expired(&entry, now) => Ok(Some(entry.clone())),
            Some(_) => {
                self.entries.remove(key);
                self.expired_removed.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, entry: RateLimitEntry) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        if entry.expires_at_millis <= now {
            return Ok(());
        }
        self.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<RateLimitEntry>> {
        let now = chrono::Utc::now().timestamp_millis();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix) && !Self::is_expired(e.value(), now))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn cleanup_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !Self::is_expired(entry, now));
        let removed = (before - self.entries.len()) as u64;
        self.expired_removed.fetch_add(removed, Ordering::Relaxed);
        *self.last_cleanup.write().unwrap() = Some(Instant::now());
        Ok(removed)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut per_tenant_counts = std::collections::HashMap::new();
        for entry in self.entries.iter() {
            if Self::is_expired(entry.value(), now) {
                continue;
            }
            if let Some((tenant, _)) = entry.key().split_once(':') {
                *per_tenant_counts.entry(tenant.to_string()).or_insert(0u64) += 1;
            }
        }

        Ok(StoreStats {
            total_entries: self.entries.len() as u64,
            expired_entries: self.expired_removed.load(Ordering::Relaxed),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            last_cleanup_millis: self
                .last_cleanup
                .read()
                .unwrap()
                .map(|_| chrono::Utc::now().timestamp_millis()),
            avg_latency: std::time::Duration::ZERO,
            per_tenant_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, ttl_ms: i64) -> RateLimitEntry {
        RateLimitEntry {
            key: key.to_string(),
            timestamps_millis: vec![chrono::Utc::now().timestamp_millis()],
            expires_at_millis: chrono::Utc::now().timestamp_millis() + ttl_ms,
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryRateLimitStore::new();
        store.set(entry("acme:u1", 10_000)).await.unwrap();
        let got = store.get("acme:u1").await.unwrap();
        assert!(got.is_some());
        assert_eq!(got.unwrap().key, "acme:u1");
    }

    #[tokio::test]
    async fn expired_entry_is_suppressed_on_get() {
        let store = InMemoryRateLimitStore::new();
        store.set(entry("acme:u1", -1)).await.unwrap();
        assert!(store.get("acme:u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_by_prefix_only_returns_live_entries() {
        let store = InMemoryRateLimitStore::new();
        store.set(entry("acme:u1", 10_000)).await.unwrap();
        store.set(entry("acme:u2", 10_000)).await.unwrap();
        store.set(entry("other:u1", 10_000)).await.unwrap();

        let mut found = store
            .get_by_prefix("acme:")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect::<Vec<_>>();
        found.sort();
        assert_eq!(found, vec!["acme:u1", "acme:u2"]);
    }

    #[tokio::test]
    async fn cleanup_expired_removes_only_stale_entries() {
        let store = InMemoryRateLimitStore::new();
        store.entries.insert("stale".into(), entry("stale", -1));
        store.set(entry("fresh", 10_000)).await.unwrap();

        let removed = store.cleanup_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.entries.contains_key("fresh"));
        assert!(!store.entries.contains_key("stale"));
    }
}
