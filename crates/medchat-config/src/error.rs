//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed
    #[error("Failed to parse config file {path}: {message}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The config file extension is neither YAML nor TOML
    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// An environment override could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// The merged configuration failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
