//! Port interfaces for dependency inversion.
//!
//! This module provides backend-agnostic trait definitions that enable
//! dependency inversion and facilitate testing. Concrete implementations
//! live in their respective infrastructure crates (`acs-ratelimit`,
//! `acs-audit`, `acs-monitor`).

pub mod audit;
pub mod health;
pub mod metrics;
pub mod rate_limit;

pub use audit::{AuditCategory, AuditEvent, AuditSink};
pub use health::{HealthCheck, HealthRegistry, HealthStatus};
pub use metrics::{BusinessMetrics, MetricsCollector};
pub use rate_limit::{Decision, Policy, RateLimitEntry, RateLimitStore, RateLimiter, StoreStats};
