//! The inference gateway: probe, generate, classify, record.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    request::DEFAULT_TEMPERATURE, Exchange, GatewayResult, GenerationError, GenerationRequest,
    InferenceProvider, ProviderError, SessionLog,
};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Per-gateway generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    /// Model every request is sent to
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl GenerationSettings {
    /// Create settings for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Mediates between the chat surface and the upstream provider.
///
/// Every failure is returned as a [`GenerationError`]; nothing escapes as a
/// fault. Successful generations are appended to the shared [`SessionLog`].
pub struct InferenceGateway {
    provider: Arc<dyn InferenceProvider>,
    log: Arc<SessionLog>,
    settings: GenerationSettings,
}

impl InferenceGateway {
    /// Create a gateway over `provider`, recording into `log`
    pub fn new(
        provider: Arc<dyn InferenceProvider>,
        log: Arc<SessionLog>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            log,
            settings,
        }
    }

    /// Configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// The log this gateway appends to
    #[must_use]
    pub fn session_log(&self) -> &Arc<SessionLog> {
        &self.log
    }

    /// The upstream provider
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn InferenceProvider> {
        &self.provider
    }

    /// Liveness probe against the model listing. Never fails.
    pub async fn check_availability(&self) -> bool {
        match self.provider.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!(provider = %self.provider.name(), error = %e, "Liveness probe failed");
                false
            }
        }
    }

    /// Model names from the upstream, with the failure preserved
    pub async fn fetch_models(&self) -> Result<Vec<String>, ProviderError> {
        self.provider.list_models().await
    }

    /// Model names from the upstream, or empty when it cannot be queried
    pub async fn list_models(&self) -> Vec<String> {
        self.fetch_models().await.unwrap_or_default()
    }

    /// Generate a medical answer for `user_text`
    pub async fn generate(&self, user_text: &str) -> GatewayResult {
        if !self.check_availability().await {
            warn!(
                provider = %self.provider.name(),
                base_url = %self.provider.base_url(),
                "Upstream unavailable, skipping generation"
            );
            return Err(GenerationError::unavailable());
        }

        let request = GenerationRequest::medical(
            self.settings.model.clone(),
            user_text,
            self.settings.temperature,
        );

        info!(model = %request.model, "Sending generation request");

        let outcome = match self.provider.generate(&request).await {
            Ok(text) if text.is_empty() => Err(GenerationError::empty_response()),
            Ok(text) => Ok(text),
            Err(e) => Err(self.classify(&e)),
        };

        match &outcome {
            Ok(text) => {
                self.log.append(Exchange::now(user_text, text.as_str()));
                debug!(chars = text.len(), "Generation succeeded");
            }
            Err(e) => {
                warn!(kind = %e.kind, model = %request.model, "Generation failed");
            }
        }

        outcome
    }

    fn classify(&self, error: &ProviderError) -> GenerationError {
        match error {
            ProviderError::Status { status, body } => {
                warn!(status = *status, body = %body, "Upstream returned an error status");
                GenerationError::upstream(*status, &self.settings.model)
            }
            ProviderError::Timeout => GenerationError::timeout(),
            ProviderError::Connection { .. } => GenerationError::connection(),
            ProviderError::Decode { .. } | ProviderError::Internal { .. } => {
                warn!(error = %error, "Unexpected generation failure");
                GenerationError::internal()
            }
        }
    }
}
