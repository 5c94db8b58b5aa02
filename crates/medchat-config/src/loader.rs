//! Layered configuration loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::{ConfigError, LogFormat, MedchatConfig};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "MEDCHAT";

/// Builds a [`MedchatConfig`] from defaults, an optional file, and the environment
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Create a loader that reads the process environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this YAML or TOML file on top of the defaults
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use these variables instead of the process environment
    #[must_use]
    pub fn with_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = Some(vars.into_iter().collect());
        self
    }

    /// Load, merge, and validate
    pub async fn load(self) -> Result<MedchatConfig, ConfigError> {
        let mut config = match &self.file {
            Some(path) => read_file(path).await?,
            None => MedchatConfig::default(),
        };

        let env = self.env.unwrap_or_else(|| {
            std::env::vars()
                .filter(|(k, _)| k.starts_with(ENV_PREFIX))
                .collect()
        });
        apply_env(&mut config, &env)?;

        config.ensure_valid()?;
        Ok(config)
    }
}

/// Load configuration from the process environment and an optional file
pub async fn load_config(file: Option<&Path>) -> Result<MedchatConfig, ConfigError> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = file {
        loader = loader.with_file(path);
    }
    loader.load().await
}

async fn read_file(path: &Path) -> Result<MedchatConfig, ConfigError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    debug!(path = %path.display(), "Reading config file");

    match extension.as_deref() {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))
        }
        Some("toml") => toml::from_str(&contents).map_err(|e| parse_error(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn apply_env(config: &mut MedchatConfig, env: &HashMap<String, String>) -> Result<(), ConfigError> {
    let get = |name: &str| env.get(&format!("{ENV_PREFIX}_{name}"));

    if let Some(host) = get("HOST") {
        config.server.host.clone_from(host);
    }
    if let Some(port) = get("PORT") {
        config.server.port = parse_env("PORT", port)?;
    }
    if let Some(model) = get("MODEL") {
        config.ollama.model.clone_from(model);
    }
    if let Some(url) = get("OLLAMA_URL") {
        config.ollama.base_url.clone_from(url);
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.logging.format = parse_env::<LogFormat>("LOG_FORMAT", format)?;
    }

    Ok(())
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: format!("{ENV_PREFIX}_{name}"),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_defaults_without_file_or_env() {
        let config = ConfigLoader::new().with_env(Vec::new()).load().await.unwrap();
        assert_eq!(config, MedchatConfig::default());
    }

    #[tokio::test]
    async fn test_yaml_file() {
        let file = write_temp(
            ".yaml",
            "server:\n  port: 8088\nollama:\n  model: mistral:7b\n  generation_timeout: 2m\n",
        );

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env(Vec::new())
            .load()
            .await
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ollama.model, "mistral:7b");
        assert_eq!(config.ollama.generation_timeout, Duration::from_secs(120));
        assert_eq!(config.ollama.probe_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_toml_file() {
        let file = write_temp(
            ".toml",
            "[ollama]\nbase_url = \"http://gpu-box:11434\"\nprobe_timeout = \"2s\"\n\n[logging]\nformat = \"json\"\n",
        );

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env(Vec::new())
            .load()
            .await
            .unwrap();

        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.ollama.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[tokio::test]
    async fn test_env_overrides_file() {
        let file = write_temp(".yaml", "server:\n  port: 8088\n");

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env(env(&[
                ("MEDCHAT_PORT", "9000"),
                ("MEDCHAT_MODEL", "phi3:mini"),
                ("MEDCHAT_OLLAMA_URL", "http://127.0.0.1:11500"),
                ("MEDCHAT_LOG_FORMAT", "json"),
            ]))
            .load()
            .await
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.ollama.model, "phi3:mini");
        assert_eq!(config.ollama.base_url, "http://127.0.0.1:11500");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[tokio::test]
    async fn test_invalid_env_port() {
        let result = ConfigLoader::new()
            .with_env(env(&[("MEDCHAT_PORT", "fifty")]))
            .load()
            .await;

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { ref key, .. }) if key == "MEDCHAT_PORT"
        ));
    }

    #[tokio::test]
    async fn test_validation_runs_after_merge() {
        let result = ConfigLoader::new()
            .with_env(env(&[("MEDCHAT_MODEL", "")]))
            .load()
            .await;

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let file = write_temp(".ini", "port=1");

        let result = ConfigLoader::new()
            .with_file(file.path())
            .with_env(Vec::new())
            .load()
            .await;

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = ConfigLoader::new()
            .with_file("/nonexistent/medchat.yaml")
            .with_env(Vec::new())
            .load()
            .await;

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn test_malformed_yaml() {
        let file = write_temp(".yml", "server: [unterminated\n");

        let result = ConfigLoader::new()
            .with_file(file.path())
            .with_env(Vec::new())
            .load()
            .await;

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
