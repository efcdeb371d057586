//! Recognized background-monitor configuration: tick intervals for the
//! storage-cleanup and health sweeps, and the degraded-health alert
//! threshold.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::builder::{BuilderResult, ValidationPatterns};
use crate::env::EnvConfigLoader;

/// Recognized monitor configuration (see the external interfaces section
/// of the design: `intervalMinutes`, `cleanupIntervalMinutes`,
/// `alertThreshold`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Health-check tick interval.
    pub interval_minutes: u64,
    /// Expired rate-limit entry cleanup tick interval.
    pub cleanup_interval_minutes: u64,
    /// Block-rate fraction above which the health tick reports the rate
    /// limiter as unhealthy, in `[0.0, 1.0]`.
    pub alert_threshold: f64,
    /// Assumed per-tenant capacity used to compute `utilization =
    /// activeEntries / max_capacity_per_tenant` on the health tick.
    pub max_capacity_per_tenant: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 1,
            cleanup_interval_minutes: 5,
            alert_threshold: 0.8,
            max_capacity_per_tenant: 10_000,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix("ACS_MONITOR_");

        let interval_minutes = loader.get_uint("INTERVAL_MINUTES").unwrap_or(1);
        let cleanup_interval_minutes = loader.get_uint("CLEANUP_INTERVAL_MINUTES").unwrap_or(5);
        let alert_threshold = loader.get_float("ALERT_THRESHOLD").unwrap_or(0.8);
        let max_capacity_per_tenant = loader.get_uint("MAX_CAPACITY_PER_TENANT").unwrap_or(10_000);

        Self {
            interval_minutes,
            cleanup_interval_minutes,
            alert_threshold,
            max_capacity_per_tenant,
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes * 60)
    }

    pub fn validate(&self) -> BuilderResult<()> {
        ValidationPatterns::validate_positive_integer(self.interval_minutes as i64, "monitor.interval_minutes")?;
        ValidationPatterns::validate_positive_integer(
            self.cleanup_interval_minutes as i64,
            "monitor.cleanup_interval_minutes",
        )?;
        ValidationPatterns::validate_unit_range(self.alert_threshold, "monitor.alert_threshold")?;
        Ok(())
    }
}
