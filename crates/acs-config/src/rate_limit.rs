//! Recognized rate-limiter configuration surface: the default policy,
//! per-tenant overrides, ordered per-endpoint overrides, and the key
//! strategy an embedding transport layer should use to derive the `id`
//! half of a rate-limit key.

use std::collections::HashMap;
use std::time::Duration;

use acs_types::ports::rate_limit::Policy;
use serde::{Deserialize, Serialize};

use crate::builder::{BuilderResult, ValidationPatterns};
use crate::env::EnvConfigLoader;

/// How an embedding transport layer should derive the `id` half of a
/// rate-limit key. The core only records the chosen strategy; deriving the
/// actual id from a request is out of scope (see the core's non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    Ip,
    User,
    UserAndEndpoint,
    ApiKey,
    Combined,
}

impl Default for KeyStrategy {
    fn default() -> Self {
        Self::User
    }
}

impl std::str::FromStr for KeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ip" => Ok(Self::Ip),
            "user" => Ok(Self::User),
            "user+endpoint" | "user_and_endpoint" | "userandendpoint" => Ok(Self::UserAndEndpoint),
            "apikey" | "api_key" => Ok(Self::ApiKey),
            "combined" => Ok(Self::Combined),
            other => Err(format!("unknown key strategy: {other}")),
        }
    }
}

/// A named sliding-window policy as it appears in configuration, before
/// being converted into `acs_types::ports::rate_limit::Policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub name: String,
    pub request_limit: u32,
    pub window_size_seconds: u64,
}

impl PolicyConfig {
    pub fn new(name: impl Into<String>, request_limit: u32, window_size_seconds: u64) -> Self {
        Self {
            name: name.into(),
            request_limit,
            window_size_seconds,
        }
    }

    pub fn to_policy(&self) -> Policy {
        Policy::new(&self.name, self.request_limit, Duration::from_secs(self.window_size_seconds))
    }

    pub fn validate(&self) -> BuilderResult<()> {
        ValidationPatterns::validate_non_empty_string(&self.name, "policy.name")?;
        ValidationPatterns::validate_positive_integer(self.request_limit as i64, "policy.request_limit")?;
        ValidationPatterns::validate_positive_integer(
            self.window_size_seconds as i64,
            "policy.window_size_seconds",
        )?;
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new("default", 100, 60)
    }
}

/// One entry of the ordered `endpointPolicies` list: the first prefix
/// match (in list order) whose `methods` includes the request's method
/// wins over `defaultPolicy`/`tenantPolicies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointPolicyConfig {
    pub path_prefix: String,
    pub methods: Vec<String>,
    pub policy: PolicyConfig,
}

/// Recognized rate-limiter configuration (see the external interfaces
/// section of the design: `enabled`, `keyStrategy`, `defaultPolicy`,
/// `tenantPolicies`, `endpointPolicies`, `excludePaths`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub key_strategy: KeyStrategy,
    pub default_policy: PolicyConfig,
    pub tenant_policies: HashMap<String, PolicyConfig>,
    pub endpoint_policies: Vec<EndpointPolicyConfig>,
    pub exclude_paths: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_strategy: KeyStrategy::default(),
            default_policy: PolicyConfig::default(),
            tenant_policies: HashMap::new(),
            endpoint_policies: Vec::new(),
            exclude_paths: vec!["/health".to_string(), "/healthz".to_string(), "/metrics".to_string()],
        }
    }
}

impl RateLimitConfig {
    /// Loads the default policy and top-level toggles from environment
    /// variables under the `ACS_RATE_LIMIT_` prefix. `tenantPolicies` and
    /// `endpointPolicies` are structured data better suited to a config
    /// file or programmatic construction; callers needing them should
    /// populate the returned value's fields directly.
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix("ACS_RATE_LIMIT_");

        let enabled = loader.get_bool("ENABLED").unwrap_or(true);
        let request_limit = loader.get_uint("REQUEST_LIMIT").unwrap_or(100) as u32;
        let window_size_seconds = loader.get_uint("WINDOW_SECONDS").unwrap_or(60);
        let policy_name = loader.get_optional("POLICY_NAME").unwrap_or_else(|| "default".to_string());
        let key_strategy = loader
            .get_optional("KEY_STRATEGY")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let exclude_paths = loader.get_list("EXCLUDE_PATHS").unwrap_or_else(|_| {
            vec!["/health".to_string(), "/healthz".to_string(), "/metrics".to_string()]
        });

        Self {
            enabled,
            key_strategy,
            default_policy: PolicyConfig::new(policy_name, request_limit, window_size_seconds),
            tenant_policies: HashMap::new(),
            endpoint_policies: Vec::new(),
            exclude_paths,
        }
    }

    pub fn with_tenant_policy(mut self, tenant_id: impl Into<String>, policy: PolicyConfig) -> Self {
        self.tenant_policies.insert(tenant_id.into(), policy);
        self
    }

    pub fn with_endpoint_policy(mut self, endpoint: EndpointPolicyConfig) -> Self {
        self.endpoint_policies.push(endpoint);
        self
    }

    /// Resolves the effective policy for a tenant, falling back to
    /// `default_policy` when no tenant-specific override exists.
    /// Endpoint-level overrides are resolved by the embedding transport
    /// layer, which has the request path available; this only covers the
    /// per-tenant layer of §6's precedence order.
    pub fn policy_for_tenant(&self, tenant_id: &str) -> &PolicyConfig {
        self.tenant_policies.get(tenant_id).unwrap_or(&self.default_policy)
    }

    pub fn validate(&self) -> BuilderResult<()> {
        self.default_policy.validate()?;
        for policy in self.tenant_policies.values() {
            policy.validate()?;
        }
        for endpoint in &self.endpoint_policies {
            ValidationPatterns::validate_non_empty_string(&endpoint.path_prefix, "endpoint.path_prefix")?;
            endpoint.policy.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_enabled_with_a_sane_default_policy() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_policy.request_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tenant_override_wins_over_default_policy() {
        let config = RateLimitConfig::default()
            .with_tenant_policy("acme", PolicyConfig::new("acme-burst", 500, 60));
        assert_eq!(config.policy_for_tenant("acme").request_limit, 500);
        assert_eq!(config.policy_for_tenant("other").request_limit, 100);
    }

    #[test]
    fn zero_request_limit_fails_validation() {
        let bad = PolicyConfig::new("broken", 0, 60);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn key_strategy_parses_recognized_names() {
        assert_eq!("ip".parse::<KeyStrategy>().unwrap(), KeyStrategy::Ip);
        assert_eq!("user+endpoint".parse::<KeyStrategy>().unwrap(), KeyStrategy::UserAndEndpoint);
        assert!("bogus".parse::<KeyStrategy>().is_err());
    }
}
