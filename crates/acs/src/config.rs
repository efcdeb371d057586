//! Aggregate configuration for [`crate::AccessControlSystem`]: the
//! recognized rate-limit, storage, and monitor surfaces from `acs-config`,
//! loaded together.

use acs_config::{MonitorConfig, RateLimitConfig, StorageConfig};
use acs_types::error::Result;

/// The full recognized configuration surface (§6 of the design): rate
/// limiting, storage backend selection, and background-monitor intervals.
#[derive(Debug, Clone)]
pub struct AcsConfig {
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
    pub monitor: MonitorConfig,
    /// Capacity of the default in-memory audit sink, used when the
    /// builder is not given an explicit `AuditSink`.
    pub audit_buffer_capacity: usize,
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
            monitor: MonitorConfig::default(),
            audit_buffer_capacity: 1024,
        }
    }
}

impl AcsConfig {
    /// Loads every sub-config from its own `ACS_*_` prefixed environment
    /// variables; see each `*Config::from_env` for the exact names.
    pub fn from_env() -> Self {
        Self {
            rate_limit: RateLimitConfig::from_env(),
            storage: StorageConfig::from_env(),
            monitor: MonitorConfig::from_env(),
            audit_buffer_capacity: 1024,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.rate_limit
            .default_policy
            .validate()
            .map_err(|e| acs_types::error::AcsError::validation(e.to_string()))?;
        self.storage
            .validate()
            .map_err(|e| acs_types::error::AcsError::validation(e.to_string()))?;
        self.monitor
            .validate()
            .map_err(|e| acs_types::error::AcsError::validation(e.to_string()))?;
        Ok(())
    }
}
