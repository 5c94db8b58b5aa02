//! Configuration types and defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MedchatConfig {
    /// HTTP listener
    #[validate(nested)]
    pub server: ServerSettings,
    /// Upstream Ollama daemon and model
    #[validate(nested)]
    pub ollama: OllamaSettings,
    /// Log output
    #[validate(nested)]
    pub logging: LoggingSettings,
}

impl MedchatConfig {
    /// Run every field and cross-field check
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate().map_err(ConfigError::from)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    #[validate(length(min = 1))]
    pub host: String,
    /// Listen port
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Upstream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_timeouts"))]
pub struct OllamaSettings {
    /// Base URL of the daemon
    #[validate(url)]
    pub base_url: String,
    /// Model every chat message is sent to
    #[validate(length(min = 1))]
    pub model: String,
    /// Sampling temperature
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// Liveness probe and model listing timeout
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Generation timeout, longer than the probe timeout
    #[serde(with = "humantime_serde")]
    pub generation_timeout: Duration,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.7,
            probe_timeout: Duration::from_secs(5),
            generation_timeout: Duration::from_secs(60),
        }
    }
}

fn validate_timeouts(settings: &OllamaSettings) -> Result<(), ValidationError> {
    if settings.probe_timeout.is_zero() {
        return Err(ValidationError::new("probe_timeout_zero"));
    }
    if settings.generation_timeout <= settings.probe_timeout {
        return Err(ValidationError::new("generation_timeout_not_longer_than_probe"));
    }
    Ok(())
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[validate(length(min = 1))]
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}
