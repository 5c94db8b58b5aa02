//! HTTP-level errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error returned by a handler, rendered as `{ "error": message }`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Client-facing message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the message as-is
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500, prefixed with `Server error: `
    pub fn server_error(detail: impl AsRef<str>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Server error: {}", detail.as_ref()),
        )
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        }
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}

/// Errors that stop the server from starting or running
#[derive(Debug, Error)]
pub enum ServerError {
    /// Host and port do not form a socket address
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
