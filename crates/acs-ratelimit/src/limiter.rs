//! The sliding-window rate limiter.
//!
//! Implements the algorithm precisely: trim timestamps older than
//! `now - window`, admit if the remaining count is under the limit, and
//! fail open on any store error rather than ever blocking a caller because
//! the backend is unavailable.

use std::sync::Arc;
use std::time::Duration;

use acs_types::ids::TenantId;
use acs_types::ports::rate_limit::{
    Decision, Policy, RateLimitEntry, RateLimitStore, RateLimiter,
};
use tracing::{debug, warn};

use crate::keyed_mutex::KeyedMutex;

/// Local read-through cache entries live for at most this long before a
/// `check`/`status` call must re-consult the backing store.
const LOCAL_CACHE_TTL: Duration = Duration::from_secs(30);

struct CachedEntry {
    entry: RateLimitEntry,
    cached_at: tokio::time::Instant,
}

/// Sliding-window rate limiter, generic over any [`RateLimitStore`]
/// backend.
pub struct SlidingWindowRateLimiter {
    store: Arc<dyn RateLimitStore>,
    locks: KeyedMutex,
    cache: dashmap::DashMap<String, CachedEntry>,
}

impl SlidingWindowRateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            locks: KeyedMutex::new(),
            cache: dashmap::DashMap::new(),
        }
    }

    fn composite_key(tenant: &TenantId, id: &str) -> String {
        format!("{}:{}", tenant.as_str(), id)
    }

    fn cache_fresh(cached: &CachedEntry) -> bool {
        cached.cached_at.elapsed() < LOCAL_CACHE_TTL
    }

    async fn load_entry(&self, key: &str) -> Result<Option<RateLimitEntry>, acs_types::AcsError> {
        if let Some(cached) = self.cache.get(key) {
            if Self::cache_fresh(&cached) {
                return Ok(Some(cached.entry.clone()));
            }
        }
        let loaded = self.store.get(key).await?;
        if let Some(entry) = &loaded {
            self.cache.insert(
                key.to_string(),
                CachedEntry {
                    entry: entry.clone(),
                    cached_at: tokio::time::Instant::now(),
                },
            );
        }
        Ok(loaded)
    }

    /// Stable marker for the fail-open annotation on a `Decision`. The
    /// underlying store error is appended for observability, but the prefix
    /// stays constant so callers can match on it without parsing backend-
    /// specific error text.
    const FAIL_OPEN_MARKER: &'static str = "rate_limit_check_failed";

    fn fail_open(limit: u32, cause: impl std::fmt::Display) -> Decision {
        Decision {
            allowed: true,
            remaining: limit,
            reset_in: Duration::ZERO,
            retry_after: None,
            fail_open_reason: Some(format!("{}: {cause}", Self::FAIL_OPEN_MARKER)),
        }
    }

    /// Shared accounting for `check` (mutating) and `status` (read-only).
    fn evaluate(
        timestamps: &[i64],
        now_millis: i64,
        policy: &Policy,
    ) -> (Vec<i64>, Decision) {
        let window_millis = policy.window.as_millis() as i64;
        let window_start = now_millis - window_millis;
        let trimmed: Vec<i64> = timestamps
            .iter()
            .copied()
            .filter(|ts| *ts >= window_start)
            .collect();

        let oldest = trimmed.first().copied();
        let reset_in = oldest
            .map(|ts| {
                let remaining_millis = (ts + window_millis - now_millis).max(0);
                Duration::from_millis(remaining_millis as u64)
            })
            .unwrap_or(Duration::ZERO);

        if (trimmed.len() as u32) < policy.request_limit {
            let remaining = policy.request_limit - trimmed.len() as u32 - 1;
            (
                trimmed,
                Decision {
                    allowed: true,
                    remaining,
                    reset_in,
                    retry_after: None,
                    fail_open_reason: None,
                },
            )
        } else {
            (
                trimmed,
                Decision {
                    allowed: false,
                    remaining: 0,
                    reset_in,
                    retry_after: Some(reset_in),
                    fail_open_reason: None,
                },
            )
        }
    }
}

#[async_trait::async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check(&self, tenant: &TenantId, id: &str, policy: &Policy) -> Decision {
        let key = Self::composite_key(tenant, id);
        let _guard = self.locks.lock(&key).await;
        let now = chrono::Utc::now().timestamp_millis();

        let existing = match self.load_entry(&key).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%key, error = %err, "rate limit store read failed, failing open");
                return Self::fail_open(policy.request_limit, err.to_string());
            }
        };

        let timestamps = existing.map(|e| e.timestamps_millis).unwrap_or_default();
        let (mut trimmed, decision) = Self::evaluate(&timestamps, now, policy);

        if decision.allowed {
            trimmed.push(now);
            let window_millis = policy.window.as_millis() as i64;
            let entry = RateLimitEntry {
                key: key.clone(),
                timestamps_millis: trimmed,
                expires_at_millis: now + 2 * window_millis,
            };

            if let Err(err) = self.store.set(entry.clone()).await {
                warn!(%key, error = %err, "rate limit store write failed, failing open");
                return Self::fail_open(policy.request_limit, err.to_string());
            }
            self.cache.insert(
                key,
                CachedEntry {
                    entry,
                    cached_at: tokio::time::Instant::now(),
                },
            );
        }

        debug!(
            tenant = %tenant,
            id,
            policy = %policy.name,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "rate limit check"
        );
        decision
    }

    async fn status(&self, tenant: &TenantId, id: &str, policy: &Policy) -> Decision {
        let key = Self::composite_key(tenant, id);
        let now = chrono::Utc::now().timestamp_millis();

        let existing = match self.load_entry(&key).await {
            Ok(entry) => entry,
            Err(err) => return Self::fail_open(policy.request_limit, err.to_string()),
        };

        let timestamps = existing.map(|e| e.timestamps_millis).unwrap_or_default();
        let (_, decision) = Self::evaluate(&timestamps, now, policy);
        decision
    }

    async fn reset(&self, tenant: &TenantId, id: &str) -> acs_types::Result<()> {
        let key = Self::composite_key(tenant, id);
        let _guard = self.locks.lock(&key).await;
        self.cache.remove(&key);
        self.store.remove(&key).await
    }

    async fn list_active(&self, tenant: &TenantId) -> acs_types::Result<Vec<RateLimitEntry>> {
        let prefix = format!("{}:", tenant.as_str());
        self.store.get_by_prefix(&prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryRateLimitStore;
    use std::time::Duration as StdDuration;

    fn policy() -> Policy {
        Policy::new("default", 3, StdDuration::from_secs(10))
    }

    #[tokio::test]
    async fn admits_up_to_the_limit_then_blocks() {
        let limiter = SlidingWindowRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()));
        let tenant = TenantId::new("acme");

        for expected_remaining in [2u32, 1, 0] {
            let decision = limiter.check(&tenant, "key", &policy()).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let blocked = limiter.check(&tenant, "key", &policy()).await;
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert!(blocked.retry_after.is_some());
    }

    #[tokio::test]
    async fn reset_clears_recorded_requests() {
        let limiter = SlidingWindowRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()));
        let tenant = TenantId::new("acme");
        for _ in 0..3 {
            limiter.check(&tenant, "key", &policy()).await;
        }
        assert!(!limiter.check(&tenant, "key", &policy()).await.allowed);

        limiter.reset(&tenant, "key").await.unwrap();
        let status = limiter.status(&tenant, "key", &policy()).await;
        assert_eq!(status.remaining, policy().request_limit);
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let limiter = SlidingWindowRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()));
        let p = Policy::new("default", 1, StdDuration::from_secs(10));

        let t1 = TenantId::new("t1");
        let t2 = TenantId::new("t2");

        assert!(limiter.check(&t1, "key", &p).await.allowed);
        assert!(!limiter.check(&t1, "key", &p).await.allowed);
        assert!(limiter.check(&t2, "key", &p).await.allowed);
    }

    #[tokio::test]
    async fn status_does_not_mutate_state() {
        let limiter = SlidingWindowRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()));
        let tenant = TenantId::new("acme");
        let p = policy();

        limiter.check(&tenant, "key", &p).await;
        let before = limiter.status(&tenant, "key", &p).await;
        let after = limiter.status(&tenant, "key", &p).await;
        assert_eq!(before.remaining, after.remaining);
    }
}
