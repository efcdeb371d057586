//! ACS-domain validation helpers returning an accumulated
//! [`ValidationResult`] rather than failing on the first error, for
//! callers (e.g. the admin API) that want to report every problem with a
//! submitted configuration at once.

use serde::{Deserialize, Serialize};

use crate::rate_limit::PolicyConfig;

/// Outcome of validating a configuration value: distinguishes hard
/// errors (the value cannot be used) from warnings (the value is usable
/// but worth flagging).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }
}

/// Validates configuration inputs that arrive as free-form strings
/// (e.g. from the admin API or a config file) before they are converted
/// into the crate's typed config structs.
pub struct CommonValidator;

impl CommonValidator {
    pub fn validate_tenant_id(tenant_id: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        if tenant_id.trim().is_empty() {
            result.add_error("tenant id cannot be empty");
        }
        if tenant_id.len() > 256 {
            result.add_error("tenant id exceeds 256 characters");
        }
        if tenant_id.contains(':') {
            result.add_warning("tenant id contains ':' which collides with the composite key separator");
        }
        result
    }

    pub fn validate_key_prefix(prefix: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        if prefix.trim().is_empty() {
            result.add_error("key prefix cannot be empty");
        }
        result
    }

    pub fn validate_path_prefix(path_prefix: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        if path_prefix.trim().is_empty() {
            result.add_error("path prefix cannot be empty");
        } else if !path_prefix.starts_with('/') {
            result.add_warning("path prefix does not start with '/'");
        }
        result
    }

    pub fn validate_policy(policy: &PolicyConfig) -> ValidationResult {
        let mut result = ValidationResult::success();
        if policy.name.trim().is_empty() {
            result.add_error("policy name cannot be empty");
        }
        if policy.request_limit == 0 {
            result.add_error("policy request_limit must be greater than 0");
        }
        if policy.window_size_seconds == 0 {
            result.add_error("policy window_size_seconds must be greater than 0");
        }
        if policy.request_limit > 1_000_000 {
            result.add_warning("policy request_limit is unusually high");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tenant_id_is_invalid() {
        let result = CommonValidator::validate_tenant_id("");
        assert!(!result.valid);
    }

    #[test]
    fn tenant_id_with_colon_warns_but_is_valid() {
        let result = CommonValidator::validate_tenant_id("tenant:1");
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn policy_with_zero_limit_is_invalid() {
        let policy = PolicyConfig::new("bad", 0, 60);
        let result = CommonValidator::validate_policy(&policy);
        assert!(!result.valid);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn merge_combines_errors_and_warnings() {
        let a = ValidationResult::error("a failed");
        let mut b = ValidationResult::success();
        b.add_warning("b is fine but odd");
        let merged = a.merge(b);
        assert!(!merged.valid);
        assert_eq!(merged.errors.len(), 1);
        assert_eq!(merged.warnings.len(), 1);
    }
}
