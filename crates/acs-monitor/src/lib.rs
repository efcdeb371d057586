//! Background monitor: periodic storage cleanup, health probing, and
//! metrics emission for the rate limiter and permission graph.
//!
//! - [`health`]: `RateLimitStore` health check feeding the health tick.
//! - [`metrics`]: Prometheus-backed `MetricsCollector`/`BusinessMetrics`.
//! - [`ticker`]: the `Monitor` struct driving the three background loops.

pub mod health;
pub mod metrics;
pub mod ticker;

pub use health::{tenant_utilization, RateLimitStoreHealthCheck};
pub use metrics::PrometheusMetrics;
pub use ticker::Monitor;
