//! # Medchat Config
//!
//! Configuration management for the medical chat relay.
//!
//! Configuration is layered:
//! 1. Built-in defaults
//! 2. An optional YAML or TOML file
//! 3. `MEDCHAT_*` environment variables
//!
//! The merged result is validated before it is handed out.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use loader::{load_config, ConfigLoader, ENV_PREFIX};
pub use settings::{LogFormat, LoggingSettings, MedchatConfig, OllamaSettings, ServerSettings};
