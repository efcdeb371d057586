//! Health check port definitions.
//!
//! Defines the abstract health check interfaces used by the monitor to
//! report component health and overall system availability.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Health status of a component.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// Component is fully operational.
    Healthy,
    /// Component is operational but degraded.
    Degraded { reason: String },
    /// Component is not operational.
    Unhealthy { error: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded { .. })
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy { .. })
    }

    pub fn description(&self) -> String {
        match self {
            HealthStatus::Healthy => "Healthy".to_string(),
            HealthStatus::Degraded { reason } => format!("Degraded: {}", reason),
            HealthStatus::Unhealthy { error } => format!("Unhealthy: {}", error),
        }
    }
}

/// A single named health check, e.g. "rate-limit-store" or "permission-graph".
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<HealthStatus>;

    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }
}

/// Aggregates multiple health checks into one overall status, matching the
/// health tick's responsibilities in the monitor.
#[async_trait]
pub trait HealthRegistry: Send + Sync {
    async fn register(&mut self, check: Arc<dyn HealthCheck>);

    async fn unregister(&mut self, name: &str) -> bool;

    async fn check_all(&self) -> HashMap<String, HealthStatus>;

    async fn is_healthy(&self) -> bool {
        self.check_all()
            .await
            .values()
            .all(|status| status.is_healthy())
    }

    async fn overall_status(&self) -> HealthStatus {
        let checks = self.check_all().await;

        if checks.is_empty() {
            return HealthStatus::Unhealthy {
                error: "no health checks registered".to_string(),
            };
        }

        let unhealthy: Vec<_> = checks
            .iter()
            .filter(|(_, status)| status.is_unhealthy())
            .collect();

        if !unhealthy.is_empty() {
            return HealthStatus::Unhealthy {
                error: format!(
                    "{} components unhealthy: {}",
                    unhealthy.len(),
                    unhealthy
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };
        }

        let degraded: Vec<_> = checks
            .iter()
            .filter(|(_, status)| status.is_degraded())
            .collect();

        if !degraded.is_empty() {
            return HealthStatus::Degraded {
                reason: format!(
                    "{} components degraded: {}",
                    degraded.len(),
                    degraded
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };
        }

        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockHealthCheck {
        name: String,
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthCheck for MockHealthCheck {
        async fn check(&self) -> Result<HealthStatus> {
            Ok(self.status.clone())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct VecRegistry(Vec<Arc<dyn HealthCheck>>);

    #[async_trait]
    impl HealthRegistry for VecRegistry {
        async fn register(&mut self, check: Arc<dyn HealthCheck>) {
            self.0.push(check);
        }

        async fn unregister(&mut self, name: &str) -> bool {
            let before = self.0.len();
            self.0.retain(|c| c.name() != name);
            self.0.len() != before
        }

        async fn check_all(&self) -> HashMap<String, HealthStatus> {
            let mut out = HashMap::new();
            for check in &self.0 {
                out.insert(check.name().to_string(), check.check().await.unwrap());
            }
            out
        }
    }

    #[test]
    fn health_status_predicates() {
        assert!(HealthStatus::Healthy.is_healthy());
        let degraded = HealthStatus::Degraded {
            reason: "latency".into(),
        };
        assert!(degraded.is_degraded());
        assert!(!degraded.is_healthy());
    }

    #[tokio::test]
    async fn overall_status_escalates_to_unhealthy() {
        let mut registry = VecRegistry(Vec::new());
        registry
            .register(Arc::new(MockHealthCheck {
                name: "store".into(),
                status: HealthStatus::Healthy,
            }))
            .await;
        registry
            .register(Arc::new(MockHealthCheck {
                name: "graph".into(),
                status: HealthStatus::Unhealthy {
                    error: "unreachable".into(),
                },
            }))
            .await;

        let status = registry.overall_status().await;
        assert!(status.is_unhealthy());
    }

    #[tokio::test]
    async fn overall_status_is_healthy_when_empty_checks_pass() {
        let mut registry = VecRegistry(Vec::new());
        registry
            .register(Arc::new(MockHealthCheck {
                name: "store".into(),
                status: HealthStatus::Healthy,
            }))
            .await;
        assert!(registry.is_healthy().await);
    }
}
