//! Environment variable loading and type conversion.
//!
//! A small, prefix-aware loader used by every `*Config::from_env`
//! constructor in this crate.

use crate::builder::{BuilderResult, ConfigValue};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Environment loading errors.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {var}")]
    NotFound { var: String },

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    #[error("type conversion error for {var}: {reason}")]
    ConversionError { var: String, reason: String },
}

/// Loads configuration values from environment variables under a common
/// prefix, with typed accessors and fallback defaults.
pub struct EnvConfigLoader {
    prefix: Option<String>,
    required: Vec<String>,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: None,
            required: Vec::new(),
            defaults: HashMap::new(),
        }
    }

    /// Set prefix for environment variables (e.g. `"ACS_"`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn require(mut self, var: impl Into<String>) -> Self {
        self.required.push(var.into());
        self
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    pub fn get(&self, var: &str) -> Result<String, EnvError> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).or_else(|_| {
            self.defaults
                .get(var)
                .cloned()
                .ok_or_else(|| EnvError::NotFound {
                    var: full_var.clone(),
                })
        })
    }

    pub fn get_optional(&self, var: &str) -> Option<String> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).ok().or_else(|| self.defaults.get(var).cloned())
    }

    pub fn get_uint(&self, var: &str) -> Result<u64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason: format!("cannot parse as unsigned integer: {e}"),
        })
    }

    pub fn get_float(&self, var: &str) -> Result<f64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason: format!("cannot parse as float: {e}"),
        })
    }

    pub fn get_bool(&self, var: &str) -> Result<bool, EnvError> {
        let value = self.get(var)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(EnvError::InvalidValue {
                var: self.make_var_name(var),
                reason: format!("invalid boolean value: {value}"),
            }),
        }
    }

    /// Parses a duration string (`"30s"`, `"5m"`, `"1h"`, `"500ms"`, or a
    /// bare integer defaulting to seconds).
    pub fn get_duration(&self, var: &str) -> Result<Duration, EnvError> {
        let value = self.get(var)?;
        parse_duration(&value).map_err(|reason| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason,
        })
    }

    pub fn get_list(&self, var: &str) -> Result<Vec<String>, EnvError> {
        let value = self.get(var)?;
        if value.is_empty() {
            return Ok(Vec::new());
        }
        Ok(value.split(',').map(|s| s.trim().to_string()).collect())
    }

    pub fn load_all(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for (key, value) in &self.defaults {
            result.insert(key.clone(), value.clone());
        }
        for (key, value) in env::vars() {
            if let Some(ref prefix) = self.prefix {
                if let Some(stripped) = key.strip_prefix(prefix) {
                    result.insert(stripped.to_lowercase(), value);
                }
            }
        }
        result
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        for var in &self.required {
            self.get(var)?;
        }
        Ok(())
    }

    fn make_var_name(&self, var: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", var.to_uppercase()),
            None => var.to_uppercase(),
        }
    }

    pub fn to_config_values(&self) -> HashMap<String, ConfigValue> {
        self.load_all()
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::String(v)))
            .collect()
    }
}

impl Default for EnvConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    if let Some(num) = s.strip_suffix("ms") {
        let num = num.parse::<u64>().map_err(|e| format!("invalid milliseconds: {e}"))?;
        Ok(Duration::from_millis(num))
    } else if let Some(num) = s.strip_suffix('s') {
        let num = num.parse::<u64>().map_err(|e| format!("invalid seconds: {e}"))?;
        Ok(Duration::from_secs(num))
    } else if let Some(num) = s.strip_suffix('m') {
        let num = num.parse::<u64>().map_err(|e| format!("invalid minutes: {e}"))?;
        Ok(Duration::from_secs(num * 60))
    } else if let Some(num) = s.strip_suffix('h') {
        let num = num.parse::<u64>().map_err(|e| format!("invalid hours: {e}"))?;
        Ok(Duration::from_secs(num * 3600))
    } else if let Ok(num) = s.parse::<u64>() {
        Ok(Duration::from_secs(num))
    } else {
        Err(format!("invalid duration format: {s}"))
    }
}

/// Convenience function to load configuration from environment.
pub fn load_from_env<T, F>(prefix: &str, builder_fn: F) -> BuilderResult<T>
where
    F: FnOnce(HashMap<String, ConfigValue>) -> BuilderResult<T>,
{
    let loader = EnvConfigLoader::new().with_prefix(prefix);
    builder_fn(loader.to_config_values())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_reads_prefixed_variable_with_fallback_default() {
        std::env::set_var("ACSTEST_VALUE", "123");
        let loader = EnvConfigLoader::new().with_prefix("ACSTEST_");
        assert_eq!(loader.get("VALUE").unwrap(), "123");
        assert_eq!(loader.get_uint("VALUE").unwrap(), 123);
        std::env::remove_var("ACSTEST_VALUE");
    }

    #[test]
    fn loader_falls_back_to_default_when_env_var_absent() {
        let loader = EnvConfigLoader::new()
            .with_prefix("ACSMISSING_")
            .default("window_seconds", "60");
        assert_eq!(loader.get("window_seconds").unwrap(), "60");
    }

    #[test]
    fn duration_parsing_supports_suffixes() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("60").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn validate_fails_when_required_variable_is_missing() {
        let loader = EnvConfigLoader::new().with_prefix("ACSVALID_").require("REQUIRED");
        assert!(loader.validate().is_err());
        std::env::set_var("ACSVALID_REQUIRED", "present");
        assert!(loader.validate().is_ok());
        std::env::remove_var("ACSVALID_REQUIRED");
    }
}
