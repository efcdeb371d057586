//! Rate limiting ports for hexagonal architecture.
//!
//! Provides backend-agnostic traits for the sliding-window rate limiter and
//! the keyed storage it reads and writes through. Concrete adapters (e.g.
//! an in-memory store, a Redis-backed store) implement `RateLimitStore`;
//! `acs-ratelimit` implements `RateLimiter` against any `RateLimitStore`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;
use crate::ids::TenantId;

/// A named sliding-window policy: at most `request_limit` admitted checks
/// per `window` for a given key.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Policy {
    pub request_limit: u32,
    pub window: Duration,
    pub name: String,
}

impl Policy {
    pub fn new(name: impl Into<String>, request_limit: u32, window: Duration) -> Self {
        Self {
            request_limit,
            window,
            name: name.into(),
        }
    }
}

/// The outcome of a `RateLimiter::check` call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in: Duration,
    pub retry_after: Option<Duration>,
    /// Set when the decision was produced by the fail-open path rather than
    /// a genuine evaluation of stored state; never set on the happy path.
    pub fail_open_reason: Option<String>,
}

impl Decision {
    pub fn is_fail_open(&self) -> bool {
        self.fail_open_reason.is_some()
    }
}

/// A persisted sliding-window entry: the ordered timestamps observed within
/// the current double-window retention horizon, plus the time at which the
/// store may reclaim this entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RateLimitEntry {
    pub key: String,
    pub timestamps_millis: Vec<i64>,
    pub expires_at_millis: i64,
}

/// Aggregate statistics exposed by a `RateLimitStore` for health and
/// metrics reporting.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct StoreStats {
    pub total_entries: u64,
    pub expired_entries: u64,
    pub total_requests: u64,
    pub last_cleanup_millis: Option<i64>,
    pub avg_latency: Duration,
    /// Live entry count per tenant id, keyed by the tenant's string form.
    pub per_tenant_counts: HashMap<String, u64>,
}

/// Backend-agnostic keyed persistence for rate-limit entries.
///
/// Implementations must never propagate backend errors as panics; on
/// backend failure, return `Err` so the caller (the rate limiter) can fail
/// open, and log the underlying cause.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Returns the live entry for `key`, or `None` if absent or expired.
    /// Implementations may opportunistically delete expired entries here.
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>>;

    /// Overwrites the entry for `key`. If `entry.expires_at_millis` is not
    /// in the future, implementations must not persist it.
    async fn set(&self, entry: RateLimitEntry) -> Result<()>;

    /// Removes the entry for `key`, if present.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Returns every live entry whose key starts with `prefix`.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<RateLimitEntry>>;

    /// Bulk-removes every entry whose `expires_at_millis` has elapsed.
    /// Returns the number of entries removed.
    async fn cleanup_expired(&self) -> Result<u64>;

    /// Current aggregate statistics for this store.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Sliding-window rate limiter port.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Checks and, if admitted, records one request against `(tenant, id)`
    /// under `policy`. Never returns `Err` for backend failure: on store
    /// error the limiter fails open and the returned `Decision` carries
    /// `fail_open_reason`.
    async fn check(&self, tenant: &TenantId, id: &str, policy: &Policy) -> Decision;

    /// Computes the same window accounting as `check` without recording a
    /// request.
    async fn status(&self, tenant: &TenantId, id: &str, policy: &Policy) -> Decision;

    /// Clears all recorded requests for `(tenant, id)`.
    async fn reset(&self, tenant: &TenantId, id: &str) -> Result<()>;

    /// Lists every live entry for `tenant`, for introspection and metrics.
    async fn list_active(&self, tenant: &TenantId) -> Result<Vec<RateLimitEntry>>;
}
