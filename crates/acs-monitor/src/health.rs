//! Rate-limit store [`HealthCheck`] used by the health tick: computes
//! per-tenant utilization and flags the store unhealthy on high latency
//! or a high block rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use acs_config::MonitorConfig;
use acs_types::error::Result;
use acs_types::ids::TenantId;
use acs_types::ports::health::{HealthCheck, HealthStatus};
use acs_types::ports::rate_limit::RateLimitStore;
use async_trait::async_trait;

const MAX_HEALTHY_AVG_LATENCY_MILLIS: u128 = 500;

/// Wraps a `RateLimitStore` to report `Degraded`/`Unhealthy` when its
/// `stats()` reflect excess latency or an elevated block rate. The block
/// rate is tracked independently by [`record_decision`](Self::record_decision),
/// since `StoreStats` only carries request counts, not the allow/block
/// split the rate limiter observes.
pub struct RateLimitStoreHealthCheck {
    store: Arc<dyn RateLimitStore>,
    alert_threshold: f64,
    allowed: AtomicU64,
    blocked: AtomicU64,
}

impl RateLimitStoreHealthCheck {
    pub fn new(store: Arc<dyn RateLimitStore>, config: &MonitorConfig) -> Self {
        Self {
            store,
            alert_threshold: config.alert_threshold,
            allowed: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        }
    }

    /// Called by the rate limiter's decision path to feed the block-rate
    /// computation observed on the health tick.
    pub fn record_decision(&self, allowed: bool) {
        if allowed {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.blocked.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn block_rate(&self) -> f64 {
        let allowed = self.allowed.load(Ordering::Relaxed);
        let blocked = self.blocked.load(Ordering::Relaxed);
        let total = allowed + blocked;
        if total == 0 {
            0.0
        } else {
            blocked as f64 / total as f64
        }
    }
}

#[async_trait]
impl HealthCheck for RateLimitStoreHealthCheck {
    async fn check(&self) -> Result<HealthStatus> {
        let stats = self.store.stats().await?;

        if stats.avg_latency.as_millis() > MAX_HEALTHY_AVG_LATENCY_MILLIS {
            return Ok(HealthStatus::Unhealthy {
                error: format!(
                    "store average latency {}ms exceeds {}ms",
                    stats.avg_latency.as_millis(),
                    MAX_HEALTHY_AVG_LATENCY_MILLIS
                ),
            });
        }

        let block_rate = self.block_rate();
        if block_rate > self.alert_threshold {
            return Ok(HealthStatus::Unhealthy {
                error: format!(
                    "block rate {block_rate:.2} exceeds threshold {:.2}",
                    self.alert_threshold
                ),
            });
        }

        Ok(HealthStatus::Healthy)
    }

    fn name(&self) -> &str {
        "rate-limit-store"
    }

    fn description(&self) -> Option<&str> {
        Some("monitors RateLimitStore latency and observed block rate")
    }
}

/// Fraction of `max_capacity_per_tenant` currently occupied by a tenant's
/// live rate-limit entries.
pub async fn tenant_utilization(
    store: &dyn RateLimitStore,
    tenant: &TenantId,
    config: &MonitorConfig,
) -> Result<f64> {
    let prefix = format!("{}:", tenant.as_str());
    let entries = store.get_by_prefix(&prefix).await?;
    Ok(entries.len() as f64 / config.max_capacity_per_tenant as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs_types::ports::rate_limit::{RateLimitEntry, StoreStats};
    use std::time::Duration;

    struct StubStore {
        stats: StoreStats,
    }

    #[async_trait]
    impl RateLimitStore for StubStore {
        async fn get(&self, _key: &str) -> Result<Option<RateLimitEntry>> {
            Ok(None)
        }

        async fn set(&self, _entry: RateLimitEntry) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn get_by_prefix(&self, _prefix: &str) -> Result<Vec<RateLimitEntry>> {
            Ok(Vec::new())
        }

        async fn cleanup_expired(&self) -> Result<u64> {
            Ok(0)
        }

        async fn stats(&self) -> Result<StoreStats> {
            Ok(self.stats.clone())
        }
    }

    #[tokio::test]
    async fn healthy_when_latency_and_block_rate_are_low() {
        let store = Arc::new(StubStore {
            stats: StoreStats {
                avg_latency: Duration::from_millis(5),
                ..Default::default()
            },
        });
        let config = MonitorConfig::default();
        let check = RateLimitStoreHealthCheck::new(store, &config);
        check.record_decision(true);
        check.record_decision(true);
        assert!(check.check().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn unhealthy_when_latency_exceeds_threshold() {
        let store = Arc::new(StubStore {
            stats: StoreStats {
                avg_latency: Duration::from_millis(900),
                ..Default::default()
            },
        });
        let config = MonitorConfig::default();
        let check = RateLimitStoreHealthCheck::new(store, &config);
        assert!(check.check().await.unwrap().is_unhealthy());
    }

    #[tokio::test]
    async fn unhealthy_when_block_rate_exceeds_threshold() {
        let store = Arc::new(StubStore {
            stats: StoreStats {
                avg_latency: Duration::from_millis(5),
                ..Default::default()
            },
        });
        let mut config = MonitorConfig::default();
        config.alert_threshold = 0.5;
        let check = RateLimitStoreHealthCheck::new(store, &config);
        for _ in 0..9 {
            check.record_decision(false);
        }
        check.record_decision(true);
        assert!(check.check().await.unwrap().is_unhealthy());
    }
}
