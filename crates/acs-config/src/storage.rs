//! Recognized storage-backend configuration: in-memory vs. distributed
//! rate-limit stores, and the connection details the distributed adapter
//! needs.

use serde::{Deserialize, Serialize};

use crate::builder::{BuilderResult, ValidationPatterns};
use crate::env::EnvConfigLoader;

/// Which `RateLimitStore` implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Memory,
    Distributed,
}

impl Default for StorageKind {
    fn default() -> Self {
        Self::Memory
    }
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Ok(Self::Memory),
            "distributed" | "redis" => Ok(Self::Distributed),
            other => Err(format!("unknown storage kind: {other}")),
        }
    }
}

/// Recognized storage configuration (see the external interfaces section
/// of the design: `kind`, `connectionString`, `keyPrefix`,
/// `cleanupIntervalMinutes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub connection_string: Option<String>,
    pub key_prefix: String,
    pub cleanup_interval_minutes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            connection_string: None,
            key_prefix: "acs:ratelimit:".to_string(),
            cleanup_interval_minutes: 5,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix("ACS_STORAGE_");

        let kind = loader
            .get_optional("KIND")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let connection_string = loader.get_optional("CONNECTION_STRING");
        let key_prefix = loader
            .get_optional("KEY_PREFIX")
            .unwrap_or_else(|| "acs:ratelimit:".to_string());
        let cleanup_interval_minutes = loader.get_uint("CLEANUP_INTERVAL_MINUTES").unwrap_or(5);

        Self {
            kind,
            connection_string,
            key_prefix,
            cleanup_interval_minutes,
        }
    }

    pub fn with_kind(mut self, kind: StorageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    pub fn validate(&self) -> BuilderResult<()> {
        ValidationPatterns::validate_non_empty_string(&self.key_prefix, "storage.key_prefix")?;
        ValidationPatterns::validate_positive_integer(
            self.cleanup_interval_minutes as i64,
            "storage.cleanup_interval_minutes",
        )?;
        if self.kind == StorageKind::Distributed {
            let connection_string = self
                .connection_string
                .as_deref()
                .unwrap_or_default();
            ValidationPatterns::validate_non_empty_string(
                connection_string,
                "storage.connection_string",
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_in_memory_storage() {
        let config = StorageConfig::default();
        assert_eq!(config.kind, StorageKind::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn distributed_storage_requires_connection_string() {
        let config = StorageConfig::default().with_kind(StorageKind::Distributed);
        assert!(config.validate().is_err());

        let config = config.with_connection_string("redis://localhost:6379");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn storage_kind_parses_recognized_names() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("redis".parse::<StorageKind>().unwrap(), StorageKind::Distributed);
        assert!("bogus".parse::<StorageKind>().is_err());
    }
}
