//! HTTP request handlers.

use axum::{extract::State, response::Html, Json};
use chrono::{SecondsFormat, Utc};
use medchat_core::{Exchange, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{error::ApiError, extractors::ChatBody, state::AppState};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// RFC 3339 with a `Z` suffix, the same form `Exchange` timestamps serialize to
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Chat page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Reply to a chat message. Gateway failures are still a 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text, or the user-facing failure message
    pub response: String,
    /// When the reply was produced
    pub timestamp: String,
}

/// POST /chat
#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    body: ChatBody,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    info!(chars = message.len(), "Chat message received");

    let response = match state.gateway.generate(message).await {
        Ok(text) => text,
        Err(failure) => {
            info!(kind = %failure.kind, "Returning failure message to client");
            failure.message
        }
    };

    debug!(preview = %response.chars().take(100).collect::<String>(), "Bot response");

    Ok(Json(ChatResponse {
        response,
        timestamp: now_iso(),
    }))
}

/// GET /history
pub async fn history(State(state): State<AppState>) -> Json<Vec<Exchange>> {
    Json(state.session_log().all())
}

/// Upstream connectivity as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OllamaStatus {
    /// Model listing answered
    Connected,
    /// Model listing failed
    Disconnected,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy": the relay itself is up
    pub status: String,
    /// Upstream connectivity
    pub ollama: OllamaStatus,
    /// Models registered upstream
    pub available_models: Vec<String>,
    /// Model chat messages are sent to
    pub current_model: String,
    /// Check time
    pub timestamp: String,
}

/// GET /health. Never fails, degrades to `disconnected`.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (ollama, available_models) = match state.gateway.fetch_models().await {
        Ok(models) => (OllamaStatus::Connected, models),
        Err(e) => {
            debug!(error = %e, "Upstream health probe failed");
            (OllamaStatus::Disconnected, Vec::new())
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        ollama,
        available_models,
        current_model: state.gateway.model().to_string(),
        timestamp: now_iso(),
    })
}

/// Outcome of the upstream diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    /// Upstream reachable and listing models
    Success,
    /// Anything else
    Error,
}

/// Response of `/test-ollama`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResponse {
    /// Outcome
    pub status: DiagnosticStatus,
    /// Human-readable summary
    pub message: String,
    /// Models registered upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_models: Option<Vec<String>>,
    /// Model chat messages are sent to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_model: Option<String>,
    /// Whether the configured model is registered upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_available: Option<bool>,
}

impl DiagnosticResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: DiagnosticStatus::Error,
            message: message.into(),
            available_models: None,
            current_model: None,
            model_available: None,
        }
    }
}

/// GET /test-ollama
#[instrument(skip(state))]
pub async fn test_ollama(State(state): State<AppState>) -> Json<DiagnosticResponse> {
    let current_model = state.gateway.model().to_string();

    let response = match state.gateway.fetch_models().await {
        Ok(models) => DiagnosticResponse {
            status: DiagnosticStatus::Success,
            message: "Ollama is running and accessible".to_string(),
            model_available: Some(models.contains(&current_model)),
            available_models: Some(models),
            current_model: Some(current_model),
        },
        Err(ProviderError::Status { status, .. }) => {
            DiagnosticResponse::error(format!("Ollama returned status {status}"))
        }
        Err(ProviderError::Connection { .. }) => DiagnosticResponse::error(
            "Cannot connect to Ollama. Make sure it's running with: ollama serve",
        ),
        Err(ProviderError::Timeout) => {
            DiagnosticResponse::error("Error testing Ollama: the request timed out")
        }
        Err(ProviderError::Decode { .. }) => {
            DiagnosticResponse::error("Error testing Ollama: the model listing could not be read")
        }
        Err(ProviderError::Internal { .. }) => {
            DiagnosticResponse::error("Error testing Ollama: unexpected client failure")
        }
    };

    Json(response)
}
