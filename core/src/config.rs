//! Layered client configuration loaded with figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `DIGEST_` prefix
//!    (`DIGEST_BASE_URL`, `DIGEST_TOKEN`, `DIGEST_MODE`)
//! 2. `digest.toml` in the working directory
//! 3. Built-in defaults

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::mode::RuntimeMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const CONFIG_FILE: &str = "digest.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Figment(Box::new(error))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(
        default,
        deserialize_with = "token_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<String>,
    #[serde(default)]
    pub mode: RuntimeMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            mode: RuntimeMode::default(),
        }
    }
}

/// Figment types env values, so `DIGEST_TOKEN=123456` arrives as a number.
fn token_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}

impl ClientConfig {
    /// Load from defaults, `./digest.toml` and `DIGEST_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Path::new(CONFIG_FILE)))
    }

    /// Provider chain with an explicit TOML path. A missing file is skipped.
    pub fn figment(toml_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("DIGEST_").only(&["base_url", "token", "mode"]))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("'{}' must start with http:// or https://", self.base_url),
            });
        }
        Ok(())
    }
}
