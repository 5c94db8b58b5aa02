//! # Medchat Gateway
//!
//! Medical chat relay in front of a local Ollama server.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (0.0.0.0:5000, llama3.2:3b, http://localhost:11434)
//! medchat-gateway
//!
//! # Start with a config file
//! medchat-gateway --config /path/to/medchat.yaml
//!
//! # Start with environment overrides
//! MEDCHAT_PORT=8080 MEDCHAT_MODEL=mistral:7b medchat-gateway
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use medchat_config::{load_config, LogFormat, MedchatConfig};
use medchat_core::{GenerationSettings, InferenceGateway, SessionLog};
use medchat_providers::{OllamaConfig, OllamaProvider};
use medchat_server::{AppState, Server, ServerConfig};
use medchat_telemetry::{init_logging, LoggingConfig};
use tracing::{error, info, warn};

/// Command-line flags. Each one overrides the file and environment.
#[derive(Debug, Parser)]
#[command(name = "medchat-gateway", version, about = "Medical chat relay for Ollama")]
struct Cli {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, env = "MEDCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Model to generate with
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long)]
    ollama_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(&self, config: &mut MedchatConfig) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.ollama.model.clone_from(model);
        }
        if let Some(url) = &self.ollama_url {
            config.ollama.base_url.clone_from(url);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
    }
}

/// Application entry point
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    let logging = LoggingConfig::new()
        .with_level(config.logging.level.clone())
        .with_json(config.logging.format == LogFormat::Json);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting medical chat relay");

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "Application failed");
        std::process::exit(1);
    }
}

async fn load(cli: &Cli) -> anyhow::Result<MedchatConfig> {
    let config = load_config(cli.config.as_deref())
        .await
        .context("loading configuration")?;
    with_overrides(cli, config)
}

/// Layer the flags over a loaded config and re-check the result
fn with_overrides(cli: &Cli, mut config: MedchatConfig) -> anyhow::Result<MedchatConfig> {
    cli.apply(&mut config);
    config.ensure_valid().context("validating configuration")?;
    Ok(config)
}

/// Main application logic
async fn run(config: MedchatConfig) -> anyhow::Result<()> {
    info!(
        host = %config.server.host,
        port = config.server.port,
        model = %config.ollama.model,
        ollama_url = %config.ollama.base_url,
        "Configuration loaded"
    );

    let provider = OllamaProvider::new(
        OllamaConfig::new(config.ollama.base_url.clone())
            .with_probe_timeout(config.ollama.probe_timeout)
            .with_generation_timeout(config.ollama.generation_timeout),
    )
    .context("creating Ollama client")?;

    let settings = GenerationSettings::new(config.ollama.model.clone())
        .with_temperature(config.ollama.temperature);
    let gateway = InferenceGateway::new(Arc::new(provider), Arc::new(SessionLog::new()), settings);

    report_upstream(&gateway).await;

    let server_config = ServerConfig::new()
        .with_host(config.server.host.clone())
        .with_port(config.server.port);

    Server::new(server_config, AppState::new(gateway))
        .run()
        .await
        .context("running HTTP server")?;

    info!("Medical chat relay shut down");
    Ok(())
}

/// Log whether Ollama is reachable and whether the configured model is installed.
/// Never prevents startup.
async fn report_upstream(gateway: &InferenceGateway) {
    match gateway.fetch_models().await {
        Ok(models) => {
            info!(models = ?models, "Ollama is reachable");
            if !models.iter().any(|m| m == gateway.model()) {
                warn!(
                    model = %gateway.model(),
                    "Model '{}' not found. Install it with: ollama pull {}",
                    gateway.model(),
                    gateway.model()
                );
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                url = %gateway.provider().base_url(),
                "Ollama is not reachable. Start it with 'ollama serve'"
            );
        }
    }
}
