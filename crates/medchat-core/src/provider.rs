//! Provider abstraction over the upstream inference server.

use async_trait::async_trait;

use crate::{GenerationRequest, ProviderError};

/// An upstream server that can list models and generate text.
///
/// Implementations own their timeouts: `probe` and `list_models` use the short
/// liveness timeout, `generate` uses the longer generation timeout.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Base URL of the upstream server
    fn base_url(&self) -> &str;

    /// Liveness probe: succeeds only on a success status from the model listing
    async fn probe(&self) -> Result<(), ProviderError>;

    /// Names of all models registered with the upstream
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    /// Run a non-streaming generation and return the raw `response` text.
    ///
    /// An absent `response` field is reported as an empty string; deciding what
    /// that means is left to the caller.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}
