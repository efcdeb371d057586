//! Configuration management for the access control core.
//!
//! Consolidates every `*Config::from_env` constructor used by the other
//! `acs-*` crates: rate-limiting policy, storage backend selection,
//! background-monitor intervals, and the generic builder/validation
//! primitives they share.
//!
//! # Example
//!
//! ```rust
//! use acs_config::{RateLimitConfig, StorageConfig, MonitorConfig};
//!
//! let rate_limit = RateLimitConfig::default();
//! let storage = StorageConfig::default();
//! let monitor = MonitorConfig::default();
//! assert!(rate_limit.validate().is_ok());
//! assert!(storage.validate().is_ok());
//! assert!(monitor.validate().is_ok());
//! ```

mod builder;
mod env;
mod monitor;
mod rate_limit;
mod storage;
mod validation;

pub use builder::{
    BuilderError, BuilderResult, ConfigBuilder, ConfigValidator, ConfigValue, DefaultConfigBuilder,
    ValidationPatterns,
};

pub use env::{load_from_env, EnvConfigLoader, EnvError};

pub use monitor::MonitorConfig;

pub use rate_limit::{EndpointPolicyConfig, KeyStrategy, PolicyConfig, RateLimitConfig};

pub use storage::{StorageConfig, StorageKind};

pub use validation::{CommonValidator, ValidationResult};
