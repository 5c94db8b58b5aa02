//! Ollama provider implementation.
//!
//! Talks to a local Ollama daemon over its native HTTP API.
//!
//! # API Endpoints
//! - Model listing: `GET {base_url}/api/tags`
//! - Generation: `POST {base_url}/api/generate` (non-streaming)

use async_trait::async_trait;
use medchat_core::{GenerationRequest, InferenceProvider, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Default address of a local Ollama daemon
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama provider configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the daemon
    pub base_url: String,
    /// Timeout for the liveness probe and model listing
    pub probe_timeout: Duration,
    /// Timeout for a generation call
    pub generation_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(5),
            generation_timeout: Duration::from_secs(60),
        }
    }
}

impl OllamaConfig {
    /// Create a configuration for the daemon at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the probe timeout
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the generation timeout
    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

/// Ollama daemon provider
pub struct OllamaProvider {
    config: OllamaConfig,
    client: Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(mut config: OllamaConfig) -> Result<Self, ProviderError> {
        url::Url::parse(&config.base_url).map_err(|e| {
            ProviderError::internal(format!("Invalid Ollama base URL '{}': {e}", config.base_url))
        })?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| ProviderError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Provider configuration
    #[must_use]
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url)
    }

    async fn get_tags(&self) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .get(self.tags_url())
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status.as_u16(), body));
        }

        Ok(response)
    }

    fn transform_request(request: &GenerationRequest) -> OllamaGenerateRequest<'_> {
        OllamaGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        }
    }
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        self.get_tags().await.map(|_| ())
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self.get_tags().await?;
        let body = response.bytes().await.map_err(|e| map_transport_error(&e))?;

        let tags: OllamaTagsResponse = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::decode(format!("Invalid tags JSON: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = self.generate_url();

        debug!(
            provider = "ollama",
            model = %request.model,
            url = %url,
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.config.generation_timeout)
            .json(&Self::transform_request(request))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Ollama generation request failed");
                map_transport_error(&e)
            })?;

        let status = response.status();
        debug!(status = %status, "Ollama response status");

        let body = response.text().await.map_err(|e| map_transport_error(&e))?;
        trace!(status = %status, body = %body, "Received Ollama response");

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Ollama returned an error");
            return Err(ProviderError::status(status.as_u16(), body));
        }

        let generated: OllamaGenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::decode(format!("Invalid generate JSON: {e}")))?;

        Ok(generated.response.unwrap_or_default())
    }
}

/// Classify a reqwest failure into the provider taxonomy
fn map_transport_error(error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_connect() || error.is_request() || error.is_body() {
        ProviderError::connection(error.to_string())
    } else if error.is_decode() {
        ProviderError::decode(error.to_string())
    } else {
        ProviderError::internal(error.to_string())
    }
}

// Ollama API Types

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    #[serde(default)]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OllamaProvider {
        let config = OllamaConfig::new(server.uri())
            .with_probe_timeout(Duration::from_millis(500))
            .with_generation_timeout(Duration::from_millis(500));
        OllamaProvider::new(config).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::medical("llama3.2:3b", "I have a cold", 0.7)
    }

    /// Base URL of a port nobody listens on, so connections are refused
    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert!(config.generation_timeout > config.probe_timeout);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = OllamaProvider::new(OllamaConfig::new("not a url"));
        assert!(matches!(result, Err(ProviderError::Internal { .. })));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let provider = OllamaProvider::new(OllamaConfig::new("http://localhost:11434/")).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:11434");
        assert_eq!(provider.tags_url(), "http://localhost:11434/api/tags");
        assert_eq!(provider.generate_url(), "http://localhost:11434/api/generate");
    }

    #[tokio::test]
    async fn test_probe_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(provider_for(&server).probe().await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider_for(&server).probe().await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let provider = OllamaProvider::new(OllamaConfig::new(dead_url())).unwrap();

        let err = provider.probe().await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = provider_for(&server).probe().await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout);
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    { "name": "llama3.2:3b", "size": 2_019_393_189_u64 },
                    { "name": "mistral:7b", "digest": "abc" }
                ]
            })))
            .mount(&server)
            .await;

        let models = provider_for(&server).list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.2:3b", "mistral:7b"]);
    }

    #[tokio::test]
    async fn test_list_models_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server).list_models().await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3.2:3b",
                "stream": false,
                "options": { "temperature": 0.7 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2:3b",
                "response": "Take fluids and rest. Disclaimer: consult a doctor.",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server).generate(&request()).await.unwrap();
        assert_eq!(text, "Take fluids and rest. Disclaimer: consult a doctor.");
    }

    #[tokio::test]
    async fn test_generate_missing_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
            .mount(&server)
            .await;

        let text = provider_for(&server).generate(&request()).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "error": "model 'llama3.2:3b' not found" })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).generate(&request()).await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "response": "too late" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).generate(&request()).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout);
    }

    #[tokio::test]
    async fn test_generate_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }
}
