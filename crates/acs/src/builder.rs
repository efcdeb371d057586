//! Builder for [`AccessControlSystem`]: wires config selection (in-memory
//! vs. distributed storage), the default audit sink, and optional
//! operator-supplied overrides into one constructed handle.

use std::sync::Arc;

use acs_admin::AdminApi;
use acs_audit::InMemoryAuditSink;
use acs_config::StorageKind;
use acs_evaluator::Evaluator;
use acs_graph::PermissionGraph;
use acs_monitor::{Monitor, PrometheusMetrics, RateLimitStoreHealthCheck};
use acs_ratelimit::store::distributed::RedisRateLimitStore;
use acs_ratelimit::store::memory::InMemoryRateLimitStore;
use acs_ratelimit::SlidingWindowRateLimiter;
use acs_types::error::{AcsError, Result};
use acs_types::ids::TenantId;
use acs_types::ports::{AuditSink, BusinessMetrics, RateLimitStore, RateLimiter};

use crate::config::AcsConfig;
use crate::AccessControlSystem;

/// Fluent builder for [`AccessControlSystem`].
///
/// ```no_run
/// # async fn example() -> anyhow::Result<()> {
/// use acs::AccessControlSystem;
///
/// let system = AccessControlSystem::builder().build().await?;
/// # Ok(())
/// # }
/// ```
pub struct AcsBuilder {
    config: AcsConfig,
    audit: Option<Arc<dyn AuditSink>>,
    metrics: Option<Arc<dyn BusinessMetrics>>,
    known_tenants: Vec<TenantId>,
}

impl AcsBuilder {
    pub fn new() -> Self {
        Self {
            config: AcsConfig::default(),
            audit: None,
            metrics: None,
            known_tenants: Vec::new(),
        }
    }

    /// Loads [`AcsConfig`] from the recognized `ACS_*` environment
    /// variables in place of the default configuration.
    pub fn with_env_config(mut self) -> Self {
        self.config = AcsConfig::from_env();
        self
    }

    pub fn with_config(mut self, config: AcsConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the default in-memory audit sink.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Enables business-metrics emission on the health tick via a
    /// Prometheus-backed collector (or any other `BusinessMetrics`).
    pub fn with_metrics(mut self, metrics: Arc<dyn BusinessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Tenants the monitor's metrics tick should report `active_limits`
    /// for. The core has no independent way to discover tenants (see
    /// `acs_monitor::Monitor::with_known_tenants`).
    pub fn with_known_tenant(mut self, tenant: TenantId) -> Self {
        self.known_tenants.push(tenant);
        self
    }

    pub async fn build(self) -> Result<AccessControlSystem> {
        self.config.validate()?;

        let store: Arc<dyn RateLimitStore> = match self.config.storage.kind {
            StorageKind::Memory => Arc::new(InMemoryRateLimitStore::new()),
            StorageKind::Distributed => {
                let url = self.config.storage.connection_string.as_deref().ok_or_else(|| {
                    AcsError::validation("distributed storage selected without a connection string")
                })?;
                let backend =
                    RedisRateLimitStore::connect(url, self.config.storage.key_prefix.clone()).await?;
                Arc::new(backend)
            }
        };

        let rate_limiter: Arc<dyn RateLimiter> = Arc::new(SlidingWindowRateLimiter::new(store.clone()));
        let graph = Arc::new(PermissionGraph::new());
        let evaluator = Arc::new(Evaluator::new(graph.clone()));
        let audit = self
            .audit
            .unwrap_or_else(|| Arc::new(InMemoryAuditSink::new(self.config.audit_buffer_capacity)));
        let admin = Arc::new(AdminApi::new(
            graph.clone(),
            evaluator.clone(),
            audit.clone(),
            rate_limiter.clone(),
        ));

        let health_check = Arc::new(RateLimitStoreHealthCheck::new(store.clone(), &self.config.monitor));
        let mut monitor_builder = Monitor::new(self.config.monitor.clone(), store.clone())
            .with_health_check(health_check.clone())
            .with_known_tenants(self.known_tenants.clone());
        let metrics = self.metrics.or_else(|| {
            let collector: Arc<dyn BusinessMetrics> = Arc::new(PrometheusMetrics::new());
            Some(collector)
        });
        if let Some(metrics) = metrics.clone() {
            monitor_builder = monitor_builder.with_metrics(metrics);
        }

        Ok(AccessControlSystem {
            graph,
            evaluator,
            rate_limiter,
            admin,
            audit,
            metrics,
            health_check,
            monitor: monitor_builder,
            config: self.config,
        })
    }
}

impl Default for AcsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
