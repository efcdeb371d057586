//! Generic configuration-builder primitives shared by every config struct
//! in this crate: a typed [`ConfigValue`] union, a [`BuilderError`]
//! taxonomy, and the small validation helpers each `*Config::from_env`
//! constructor uses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Builder error types.
#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingRequired { field: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("environment variable error: {var} - {reason}")]
    EnvError { var: String, reason: String },

    #[error("type conversion error for {field}: {reason}")]
    ConversionError { field: String, reason: String },
}

pub type BuilderResult<T> = Result<T, BuilderError>;

/// Trait implemented by configuration builders that can be driven from a
/// bag of loosely typed [`ConfigValue`]s (e.g. environment variables).
pub trait ConfigBuilder<T> {
    fn build(self) -> BuilderResult<T>;
    fn validate(&self) -> BuilderResult<()>;
    fn load_from_env_var(&mut self, field: &str, env_var: &str) -> &mut Self;
    fn load_from_env(&mut self) -> &mut Self;
}

/// Trait for configuration structs that can validate themselves.
pub trait ConfigValidator {
    fn validate(&self) -> BuilderResult<()>;

    fn validation_errors(&self) -> Vec<BuilderError> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e],
        }
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// A loosely typed configuration value, used to carry environment-sourced
/// strings through to their eventual typed field without every call site
/// re-implementing its own parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    UnsignedInteger(u64),
    Float(f64),
    Boolean(bool),
    Duration(Duration),
    OptionalString(Option<String>),
    StringList(Vec<String>),
}

impl ConfigValue {
    pub fn as_string(&self) -> BuilderResult<String> {
        match self {
            ConfigValue::String(s) => Ok(s.clone()),
            ConfigValue::OptionalString(Some(s)) => Ok(s.clone()),
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to string"),
            }),
        }
    }

    pub fn as_unsigned_integer(&self) -> BuilderResult<u64> {
        match self {
            ConfigValue::UnsignedInteger(u) => Ok(*u),
            ConfigValue::Integer(i) if *i >= 0 => Ok(*i as u64),
            ConfigValue::String(s) => s.parse().map_err(|e| BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot parse {s:?} as unsigned integer: {e}"),
            }),
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to unsigned integer"),
            }),
        }
    }

    pub fn as_float(&self) -> BuilderResult<f64> {
        match self {
            ConfigValue::Float(f) => Ok(*f),
            ConfigValue::Integer(i) => Ok(*i as f64),
            ConfigValue::UnsignedInteger(u) => Ok(*u as f64),
            ConfigValue::String(s) => s.parse().map_err(|e| BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot parse {s:?} as float: {e}"),
            }),
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to float"),
            }),
        }
    }

    pub fn as_boolean(&self) -> BuilderResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            ConfigValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(BuilderError::ConversionError {
                    field: "unknown".to_string(),
                    reason: format!("cannot parse {s:?} as boolean"),
                }),
            },
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to boolean"),
            }),
        }
    }

    pub fn as_duration(&self) -> BuilderResult<Duration> {
        match self {
            ConfigValue::Duration(d) => Ok(*d),
            ConfigValue::Integer(i) => Ok(Duration::from_secs((*i).max(0) as u64)),
            ConfigValue::UnsignedInteger(u) => Ok(Duration::from_secs(*u)),
            ConfigValue::String(s) => crate::env::parse_duration(s).map_err(|e| {
                BuilderError::ConversionError {
                    field: "unknown".to_string(),
                    reason: e,
                }
            }),
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to duration"),
            }),
        }
    }

    pub fn as_string_list(&self) -> BuilderResult<Vec<String>> {
        match self {
            ConfigValue::StringList(list) => Ok(list.clone()),
            ConfigValue::String(s) if s.is_empty() => Ok(Vec::new()),
            ConfigValue::String(s) => Ok(s.split(',').map(|s| s.trim().to_string()).collect()),
            _ => Err(BuilderError::ConversionError {
                field: "unknown".to_string(),
                reason: format!("cannot convert {self:?} to string list"),
            }),
        }
    }
}

/// A generic field bag driving [`ConfigBuilder`] implementations: fields
/// set explicitly win over defaults, and `required_fields` are checked at
/// [`DefaultConfigBuilder::validate_required_fields`].
pub struct DefaultConfigBuilder<T> {
    fields: HashMap<String, ConfigValue>,
    required_fields: Vec<String>,
    defaults: HashMap<String, ConfigValue>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> DefaultConfigBuilder<T> {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            required_fields: Vec::new(),
            defaults: HashMap::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn require_field(&mut self, field: &str) -> &mut Self {
        self.required_fields.push(field.to_string());
        self
    }

    pub fn default_value(&mut self, field: &str, value: ConfigValue) -> &mut Self {
        self.defaults.insert(field.to_string(), value);
        self
    }

    pub fn set_field(&mut self, field: &str, value: ConfigValue) -> &mut Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn get_field(&self, field: &str) -> Option<&ConfigValue> {
        self.fields.get(field).or_else(|| self.defaults.get(field))
    }

    pub fn get_required_field(&self, field: &str) -> BuilderResult<&ConfigValue> {
        self.get_field(field)
            .ok_or_else(|| BuilderError::MissingRequired {
                field: field.to_string(),
            })
    }

    pub fn from_env_with_prefix(&mut self, prefix: &str) -> &mut Self {
        for (key, value) in std::env::vars() {
            if let Some(field_name) = key.strip_prefix(&format!("{prefix}_")) {
                self.fields
                    .insert(field_name.to_lowercase(), ConfigValue::String(value));
            }
        }
        self
    }

    pub fn validate_required_fields(&self) -> BuilderResult<()> {
        for field in &self.required_fields {
            if !self.fields.contains_key(field) && !self.defaults.contains_key(field) {
                return Err(BuilderError::MissingRequired {
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<T> Default for DefaultConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Common validation patterns shared across `*Config::validate`
/// implementations.
pub struct ValidationPatterns;

impl ValidationPatterns {
    pub fn validate_positive_integer(value: i64, field: &str) -> BuilderResult<()> {
        if value <= 0 {
            return Err(BuilderError::InvalidValue {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_non_empty_string(value: &str, field: &str) -> BuilderResult<()> {
        if value.trim().is_empty() {
            return Err(BuilderError::InvalidValue {
                field: field.to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_positive_duration(duration: Duration, field: &str) -> BuilderResult<()> {
        if duration.is_zero() {
            return Err(BuilderError::InvalidValue {
                field: field.to_string(),
                reason: "duration must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_unit_range(value: f64, field: &str) -> BuilderResult<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(BuilderError::InvalidValue {
                field: field.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }
        Ok(())
    }
}

/// Defines a simple builder struct with `Option<T>` fields, a fluent
/// consuming setter, an in-place `set_*`/`get_*` pair, and a `build()`
/// that fills in defaults and errors on anything still missing.
#[macro_export]
macro_rules! config_builder {
    (
        $name:ident {
            $(
                $field:ident: $type:ty $(= $default:expr)?,
            )*
        }
    ) => {
        pub struct $name {
            $(
                $field: Option<$type>,
            )*
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    $(
                        $field: None,
                    )*
                }
            }

            $(
                pub fn $field(mut self, value: $type) -> Self {
                    self.$field = Some(value);
                    self
                }

                paste::paste! {
                    pub fn [<set_ $field>](&mut self, value: $type) -> &mut Self {
                        self.$field = Some(value);
                        self
                    }

                    pub fn [<get_ $field>](&self) -> Option<&$type> {
                        self.$field.as_ref()
                    }
                }
            )*

            pub fn build(self) -> $crate::BuilderResult<$name> {
                Ok($name {
                    $(
                        $field: self.$field.or_else(|| {
                            $(Some($default))?
                        }).ok_or_else(|| $crate::BuilderError::MissingRequired {
                            field: stringify!($field).to_string(),
                        })?,
                    )*
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}
