//! Error types for the gateway.
//!
//! Two layers live here. [`ProviderError`] describes what went wrong on the
//! wire between the relay and the inference server. [`GenerationError`] is what
//! the gateway hands back to callers: a classified [`ErrorKind`] plus a
//! user-facing remediation message that never carries library error text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result of a gateway generation: the generated text or a classified failure.
pub type GatewayResult<T = String> = Result<T, GenerationError>;

/// Transport-level failure reported by an [`crate::InferenceProvider`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The upstream did not answer within the configured timeout
    #[error("upstream request timed out")]
    Timeout,

    /// The upstream could not be reached (refused, reset, DNS)
    #[error("upstream connection failed: {message}")]
    Connection {
        /// Description of the connection failure
        message: String,
    },

    /// The upstream answered with a non-success status
    #[error("upstream returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// The upstream answered but the body could not be decoded
    #[error("invalid upstream response: {message}")]
    Decode {
        /// Description of the decode failure
        message: String,
    },

    /// Anything else (client construction, unexpected library failures)
    #[error("internal provider error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },
}

impl ProviderError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the upstream is unreachable
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Classification of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Upstream unreachable, or the liveness probe failed
    ConnectionError,
    /// Upstream too slow
    Timeout,
    /// Upstream reachable but returned a failure status
    UpstreamError,
    /// Well-formed response without any generated text
    EmptyResponse,
    /// Anything unclassified
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name, used in logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "connection_error",
            Self::Timeout => "timeout",
            Self::UpstreamError => "upstream_error",
            Self::EmptyResponse => "empty_response",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed generation, carrying the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct GenerationError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Human-readable remediation hint
    pub message: String,
}

impl GenerationError {
    /// Create a new generation error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The liveness probe failed before any generation was attempted
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(
            ErrorKind::ConnectionError,
            "Cannot connect to Ollama server. Please make sure Ollama is running with 'ollama serve'",
        )
    }

    /// The generation call itself could not reach the upstream
    #[must_use]
    pub fn connection() -> Self {
        Self::new(
            ErrorKind::ConnectionError,
            "Cannot connect to Ollama server. Please ensure Ollama is running with 'ollama serve'",
        )
    }

    /// The generation call timed out
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(
            ErrorKind::Timeout,
            "Request timed out. The AI model might be loading. Please wait a moment and try again.",
        )
    }

    /// The upstream answered with a failure status
    #[must_use]
    pub fn upstream(status: u16, model: &str) -> Self {
        Self::new(
            ErrorKind::UpstreamError,
            format!(
                "Ollama server error (Status {status}). Make sure the model '{model}' is installed with: ollama pull {model}"
            ),
        )
    }

    /// The upstream answered without any text
    #[must_use]
    pub fn empty_response() -> Self {
        Self::new(
            ErrorKind::EmptyResponse,
            "Received empty response from AI model. Try asking your question differently.",
        )
    }

    /// Anything unclassified
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            ErrorKind::Internal,
            "An unexpected error occurred. Please try again.",
        )
    }
}
