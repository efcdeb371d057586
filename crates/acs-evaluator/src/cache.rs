//! Short-TTL decision cache, keyed by `(tenant, principal, verb, uri)`.
//!
//! Conservative invalidation: any graph mutation in a tenant invalidates
//! every cached decision for that tenant, rather than tracing which
//! principals/resources the mutation could have affected. A stale grant
//! surviving past a mutation would be a security bug; an extra cache miss
//! is only a performance cost.

use std::sync::Arc;
use std::time::{Duration, Instant};

use acs_types::ids::{TenantId, UserId};
use dashmap::DashMap;

use crate::decision::EvaluationResult;

#[derive(Clone)]
struct CacheEntry {
    result: EvaluationResult,
    expires_at: Instant,
}

/// A per-tenant map of cached decisions, each with an independent expiry.
/// `invalidate_tenant` drops the tenant's whole map rather than scanning
/// entries, so it is O(1) regardless of cache size.
pub struct DecisionCache {
    ttl: Duration,
    tenants: DashMap<TenantId, Arc<DashMap<CacheKey, CacheEntry>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    principal: UserId,
    verb: String,
    uri: String,
}

impl DecisionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tenants: DashMap::new(),
        }
    }

    pub fn get(
        &self,
        tenant: &TenantId,
        principal: UserId,
        verb: &str,
        uri: &str,
    ) -> Option<EvaluationResult> {
        let key = CacheKey {
            principal,
            verb: verb.to_string(),
            uri: uri.to_string(),
        };
        let map = self.tenants.get(tenant)?;
        let entry = map.get(&key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.result.clone())
    }

    pub fn put(
        &self,
        tenant: &TenantId,
        principal: UserId,
        verb: &str,
        uri: &str,
        result: EvaluationResult,
    ) {
        if self.ttl.is_zero() {
            return;
        }
        let key = CacheKey {
            principal,
            verb: verb.to_string(),
            uri: uri.to_string(),
        };
        let map = self
            .tenants
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(DashMap::new()))
            .clone();
        map.insert(
            key,
            CacheEntry {
                result,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops every cached decision for `tenant`. Call after any mutation
    /// that touches that tenant's graph.
    pub fn invalidate_tenant(&self, tenant: &TenantId) {
        self.tenants.remove(tenant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;

    fn sample_result() -> EvaluationResult {
        EvaluationResult::new(Decision::Allow, vec![])
    }

    #[test]
    fn put_then_get_returns_the_cached_result_before_expiry() {
        let cache = DecisionCache::new(Duration::from_secs(60));
        let tenant = TenantId::new("t1");
        cache.put(&tenant, UserId::new(1), "GET", "/a", sample_result());
        let hit = cache.get(&tenant, UserId::new(1), "GET", "/a");
        assert!(hit.is_some());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = DecisionCache::new(Duration::ZERO);
        let tenant = TenantId::new("t1");
        cache.put(&tenant, UserId::new(1), "GET", "/a", sample_result());
        assert!(cache.get(&tenant, UserId::new(1), "GET", "/a").is_none());
    }

    #[test]
    fn invalidate_tenant_clears_all_entries_for_that_tenant() {
        let cache = DecisionCache::new(Duration::from_secs(60));
        let tenant = TenantId::new("t1");
        let other = TenantId::new("t2");
        cache.put(&tenant, UserId::new(1), "GET", "/a", sample_result());
        cache.put(&other, UserId::new(1), "GET", "/a", sample_result());

        cache.invalidate_tenant(&tenant);

        assert!(cache.get(&tenant, UserId::new(1), "GET", "/a").is_none());
        assert!(cache.get(&other, UserId::new(1), "GET", "/a").is_some());
    }

    #[test]
    fn entries_expire_after_ttl_elapses() {
        let cache = DecisionCache::new(Duration::from_millis(1));
        let tenant = TenantId::new("t1");
        cache.put(&tenant, UserId::new(1), "GET", "/a", sample_result());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&tenant, UserId::new(1), "GET", "/a").is_none());
    }
}
