//! Redis-backed `RateLimitStore`.
//!
//! Provides distributed rate-limit state shared across many instances.
//! Entries are stored as JSON under `{prefix}{key}`; a Redis sorted set
//! `{prefix}cleanup_set` indexes every live key by `expires_at_millis` so
//! `cleanup_expired` can reclaim stale entries without a full key scan.
//!
//! # Key Structure
//! - `{prefix}{tenant}:{id}` — the serialized [`RateLimitEntry`].
//! - `{prefix}cleanup_set` — sorted set, member = full key, score = expiry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, warn};

use acs_types::error::{AcsError, Result};
use acs_types::ports::rate_limit::{RateLimitEntry, RateLimitStore, StoreStats};

/// Redis-based implementation of [`RateLimitStore`].
pub struct RedisRateLimitStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRateLimitStore {
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AcsError::store_unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis connect failed: {e}")))?;
        Ok(Self {
            conn,
            prefix: key_prefix.into(),
        })
    }

    pub fn with_connection(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: key_prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn cleanup_set_key(&self) -> String {
        format!("{}cleanup_set", self.prefix)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.full_key(key))
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis GET failed: {e}")))?;

        match raw {
            Some(json) => {
                let entry: RateLimitEntry = serde_json::from_str(&json)?;
                let now = chrono::Utc::now().timestamp_millis();
                if entry.expires_at_millis <= now {
                    Ok(None)
                } else {
                    Ok(Some(entry))
                }
            }
            None => Ok(None),
        }
    }

    async fn set(&self, entry: RateLimitEntry) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let ttl_millis = entry.expires_at_millis - now;
        if ttl_millis <= 0 {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let full_key = self.full_key(&entry.key);
        let json = serde_json::to_string(&entry)?;

        let () = conn
            .pset_ex(&full_key, json, ttl_millis as u64)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis SET failed: {e}")))?;

        let () = conn
            .zadd(self.cleanup_set_key(), &full_key, entry.expires_at_millis)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis ZADD failed: {e}")))?;

        debug!(key = %entry.key, ttl_millis, "persisted rate-limit entry to redis");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let full_key = self.full_key(key);
        let _: i64 = conn
            .del(&full_key)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis DEL failed: {e}")))?;
        let _: i64 = conn
            .zrem(self.cleanup_set_key(), &full_key)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis ZREM failed: {e}")))?;
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<RateLimitEntry>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}{}*", self.prefix, prefix);
        let keys: Vec<String> = conn
            .keys(&pattern)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis KEYS failed: {e}")))?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = conn
            .mget(&keys)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis MGET failed: {e}")))?;

        let now = chrono::Utc::now().timestamp_millis();
        let mut out = Vec::with_capacity(values.len());
        for raw in values.into_iter().flatten() {
            if let Ok(entry) = serde_json::from_str::<RateLimitEntry>(&raw) {
                if entry.expires_at_millis > now {
                    out.push(entry);
                }
            }
        }
        Ok(out)
    }

    async fn cleanup_expired(&self) -> Result<u64> {
        let mut conn = self.conn.clone();
        let now = chrono::Utc::now().timestamp_millis();
        let cleanup_set = self.cleanup_set_key();

        let stale: Vec<String> = conn
            .zrangebyscore(&cleanup_set, f64::NEG_INFINITY, now as f64)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis ZRANGEBYSCORE failed: {e}")))?;

        if stale.is_empty() {
            return Ok(0);
        }

        let removed: i64 = conn
            .del(&stale)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis DEL failed: {e}")))?;

        let _: i64 = conn
            .zrembyscore(&cleanup_set, f64::NEG_INFINITY, now as f64)
            .await
            .map_err(|e| AcsError::store_unavailable(format!("redis ZREMRANGEBYSCORE failed: {e}")))?;

        if removed > 0 {
            debug!(removed, "reclaimed expired rate-limit entries from redis");
        }
        Ok(removed.max(0) as u64)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut conn = self.conn.clone();
        let total_entries: u64 = conn
            .zcard(self.cleanup_set_key())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "redis ZCARD failed while computing stats");
                0
            });

        let members: Vec<String> = conn.zrange(self.cleanup_set_key(), 0, -1).await.unwrap_or_else(|e| {
            warn!(error = %e, "redis ZRANGE failed while computing per-tenant stats");
            Vec::new()
        });

        let mut per_tenant_counts = std::collections::HashMap::new();
        for member in members {
            if let Some(unprefixed) = member.strip_prefix(&self.prefix) {
                if let Some((tenant, _)) = unprefixed.split_once(':') {
                    *per_tenant_counts.entry(tenant.to_string()).or_insert(0u64) += 1;
                }
            }
        }

        Ok(StoreStats {
            total_entries,
            expired_entries: 0,
            total_requests: 0,
            last_cleanup_millis: None,
            avg_latency: std::time::Duration::ZERO,
            per_tenant_counts,
        })
    }
}
