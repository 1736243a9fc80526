use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

use crate::codec::{CodecOptions, CoercionPolicy};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Adapter configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// What decode does with malformed numbers, JSON and array indices
    pub coercion_policy: CoercionPolicy,

    /// Parse JSON text submitted for scalar mixed properties
    pub parse_scalar_mixed: bool,

    /// Upper bound (exclusive) for array indices in flat parameters
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Max array length must be between 1 and 100000"
    ))]
    pub max_array_len: usize,

    /// Page size used when a list request does not name one
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Default limit must be between 1 and 1000"
    ))]
    pub default_limit: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            coercion_policy: CoercionPolicy::BestEffort,
            parse_scalar_mixed: false,
            max_array_len: 1000,
            default_limit: 10,
        }
    }
}

impl AdapterConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let policy = env_var_or("ADMINBRIDGE_COERCION_POLICY", "best_effort")?;

        let config = Self {
            coercion_policy: CoercionPolicy::parse(&policy).ok_or_else(|| ConfigError::Parse {
                field: "ADMINBRIDGE_COERCION_POLICY".to_string(),
                value: policy.clone(),
                source: "expected 'strict' or 'best_effort'".into(),
            })?,
            parse_scalar_mixed: parse_env_var("ADMINBRIDGE_PARSE_SCALAR_MIXED", "false")?,
            max_array_len: parse_env_var("ADMINBRIDGE_MAX_ARRAY_LEN", "1000")?,
            default_limit: parse_env_var("ADMINBRIDGE_DEFAULT_LIMIT", "10")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            policy: self.coercion_policy,
            parse_scalar_mixed: self.parse_scalar_mixed,
            max_array_len: self.max_array_len,
        }
    }
}

/// Read an environment variable, falling back to `default` when it is unset
///
/// A set but non-UTF-8 value is an error rather than a silent default.
fn env_var_or(key: &str, default: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env_var_or(key, default)?;
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
