//! # ACS — Access Control System facade
//!
//! Unified entry point wiring the authorization and rate-limiting core
//! (`acs-graph`, `acs-evaluator`, `acs-ratelimit`, `acs-admin`,
//! `acs-monitor`, `acs-audit`) behind one handle, mirroring how the
//! teacher workspace's facade crate composes its component crates behind a
//! builder.
//!
//! ## Example
//!
//! ```no_run
//! use acs::AccessControlSystem;
//! use acs_types::ids::TenantId;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut system = AccessControlSystem::builder().build().await?;
//! system.start_monitor();
//!
//! let tenant = TenantId::new("acme");
//! let user = system.admin().create_user(&tenant, "bootstrap", "alice@example.com").await?;
//! let resource = system.admin().create_resource(&tenant, "bootstrap", "/docs/*").await?;
//! system
//!     .admin()
//!     .set_user_access(&tenant, "bootstrap", user, resource, "READ", true)
//!     .await?;
//!
//! let decision = system.evaluate(&tenant, user, "READ", "/docs/readme").await;
//! assert!(decision.decision.is_allow());
//!
//! let rate = system.check_rate_limit(&tenant, "alice", None, None).await;
//! assert!(rate.allowed);
//!
//! system.stop_monitor().await;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod prelude;
pub mod telemetry;

use std::sync::Arc;

use acs_admin::AdminApi;
use acs_evaluator::decision::EvaluationResult;
use acs_evaluator::Evaluator;
use acs_graph::PermissionGraph;
use acs_monitor::{Monitor, RateLimitStoreHealthCheck};
use acs_types::error::Result;
use acs_types::ids::{TenantId, UserId};
use acs_types::ports::rate_limit::{Decision, Policy, RateLimitEntry};
use acs_types::ports::{AuditSink, BusinessMetrics, RateLimiter};

pub use builder::AcsBuilder;
pub use config::AcsConfig;

pub use acs_evaluator::decision::{Decision as EvalDecision, ReasonEntry};
pub use acs_types::error::AcsError;
pub use acs_types::ids::{EntityId, GroupId, ResourceId, RoleId, SchemeId, VerbId};

/// The unified access control system handle. Construct via
/// [`AccessControlSystem::builder`].
pub struct AccessControlSystem {
    graph: Arc<PermissionGraph>,
    evaluator: Arc<Evaluator>,
    rate_limiter: Arc<dyn RateLimiter>,
    admin: Arc<AdminApi>,
    audit: Arc<dyn AuditSink>,
    metrics: Option<Arc<dyn BusinessMetrics>>,
    health_check: Arc<RateLimitStoreHealthCheck>,
    monitor: Monitor,
    config: AcsConfig,
}

impl AccessControlSystem {
    pub fn builder() -> AcsBuilder {
        AcsBuilder::new()
    }

    /// Evaluates `(tenant, principal, verb, uri)` against the permission
    /// graph (C3/C4). See `acs_evaluator::Evaluator::evaluate` for the
    /// deny-wins combining rule.
    pub async fn evaluate(
        &self,
        tenant: &TenantId,
        principal: UserId,
        verb: &str,
        uri: &str,
    ) -> EvaluationResult {
        let result = self.evaluator.evaluate(tenant, principal, verb, uri).await;
        if let Some(metrics) = &self.metrics {
            metrics.record_decision(tenant.as_str(), result.decision.is_allow());
        }
        result
    }

    /// Checks and, if admitted, records one request against `(tenant,
    /// id)`. `path`/`method` select an endpoint policy override (first
    /// matching `path_prefix` in `config.rate_limit.endpoint_policies`
    /// wins); absent that, a tenant override, then the default policy.
    pub async fn check_rate_limit(
        &self,
        tenant: &TenantId,
        id: &str,
        path: Option<&str>,
        method: Option<&str>,
    ) -> Decision {
        let policy = self.resolve_policy(tenant, path, method);
        let decision = self.rate_limiter.check(tenant, id, &policy).await;
        if let Some(metrics) = &self.metrics {
            if decision.allowed {
                metrics.record_request_allowed(tenant.as_str(), &policy.name);
            } else {
                metrics.record_request_blocked(tenant.as_str(), &policy.name);
            }
        }
        self.health_check.record_decision(decision.allowed);
        decision
    }

    /// Computes the same sliding-window accounting as `check_rate_limit`
    /// without recording a request.
    pub async fn rate_limit_status(
        &self,
        tenant: &TenantId,
        id: &str,
        path: Option<&str>,
        method: Option<&str>,
    ) -> Decision {
        let policy = self.resolve_policy(tenant, path, method);
        self.rate_limiter.status(tenant, id, &policy).await
    }

    pub async fn list_active_rate_limits(&self, tenant: &TenantId) -> Result<Vec<RateLimitEntry>> {
        self.rate_limiter.list_active(tenant).await
    }

    /// The mutating admin API (C7): user/group/role/resource CRUD,
    /// membership and role assignment, grant/deny, and rate-limit reset.
    pub fn admin(&self) -> &AdminApi {
        &self.admin
    }

    pub fn graph(&self) -> &Arc<PermissionGraph> {
        &self.graph
    }

    pub fn config(&self) -> &AcsConfig {
        &self.config
    }

    /// Starts the background cleanup/health/metrics ticks. Idempotent.
    pub fn start_monitor(&mut self) {
        self.monitor.start();
    }

    /// Signals the background ticks to stop and waits up to one second.
    pub async fn stop_monitor(&mut self) {
        self.monitor.stop().await;
    }

    pub fn is_monitor_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Resolves the effective policy for `(tenant, path, method)` per the
    /// recognized configuration's precedence: an endpoint override (first
    /// matching `path_prefix` whose `methods` includes `method`, in list
    /// order) beats a tenant override, which beats the default policy.
    fn resolve_policy(&self, tenant: &TenantId, path: Option<&str>, method: Option<&str>) -> Policy {
        if let Some(path) = path {
            for endpoint in &self.config.rate_limit.endpoint_policies {
                let prefix_matches = path.starts_with(&endpoint.path_prefix);
                let method_matches = endpoint.methods.is_empty()
                    || method
                        .map(|m| endpoint.methods.iter().any(|allowed| allowed.eq_ignore_ascii_case(m)))
                        .unwrap_or(false);
                if prefix_matches && method_matches {
                    return endpoint.policy.to_policy();
                }
            }
        }

        if let Some(policy) = self.config.rate_limit.tenant_policies.get(tenant.as_str()) {
            return policy.to_policy();
        }

        self.config.rate_limit.default_policy.to_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn end_to_end_grant_then_allow() {
        let mut system = AccessControlSystem::builder().build().await.unwrap();
        system.start_monitor();
        assert!(system.is_monitor_running());

        let tenant = TenantId::new("acme");
        let user = system
            .admin()
            .create_user(&tenant, "bootstrap", "alice@example.com")
            .await
            .unwrap();
        let resource = system
            .admin()
            .create_resource(&tenant, "bootstrap", "/docs/*")
            .await
            .unwrap();
        system
            .admin()
            .set_user_access(&tenant, "bootstrap", user, resource, "READ", true)
            .await
            .unwrap();

        let result = system.evaluate(&tenant, user, "READ", "/docs/readme").await;
        assert!(result.decision.is_allow());

        let rate = system.check_rate_limit(&tenant, "alice", None, None).await;
        assert!(rate.allowed);

        system.stop_monitor().await;
        assert!(!system.is_monitor_running());
    }

    #[tokio::test]
    async fn empty_graph_evaluation_is_not_applicable() {
        let system = AccessControlSystem::builder().build().await.unwrap();
        let tenant = TenantId::new("acme");
        let user = system
            .admin()
            .create_user(&tenant, "bootstrap", "bob@example.com")
            .await
            .unwrap();

        let result = system.evaluate(&tenant, user, "READ", "/anything").await;
        assert!(!result.decision.is_allow());
    }

    #[tokio::test]
    async fn endpoint_policy_overrides_default_policy() {
        use acs_config::{EndpointPolicyConfig, PolicyConfig};

        let mut config = AcsConfig::default();
        config.rate_limit.endpoint_policies.push(EndpointPolicyConfig {
            path_prefix: "/api/expensive".to_string(),
            methods: vec!["POST".to_string()],
            policy: PolicyConfig::new("expensive", 1, 60),
        });

        let system = AccessControlSystem::builder().with_config(config).build().await.unwrap();
        let tenant = TenantId::new("acme");

        let first = system
            .check_rate_limit(&tenant, "alice", Some("/api/expensive/run"), Some("POST"))
            .await;
        assert!(first.allowed);
        assert_eq!(first.remaining, 0);

        let second = system
            .check_rate_limit(&tenant, "alice", Some("/api/expensive/run"), Some("POST"))
            .await;
        assert!(!second.allowed);
    }
}
