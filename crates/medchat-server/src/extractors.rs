//! Custom Axum extractors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Body of `POST /chat`.
///
/// A missing or `null` `message` is kept as `None` so the handler can answer
/// with a 400. A body that is not a JSON object, or a `message` that is not a
/// string, is rejected with a 500. The content type is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatBody {
    /// The raw message, untrimmed
    pub message: Option<String>,
}

impl ChatBody {
    /// Parse a request body
    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            debug!(error = %e, "Rejecting chat body");
            ApiError::server_error("request body is not valid JSON")
        })?;

        let Value::Object(mut fields) = value else {
            return Err(ApiError::server_error("request body must be a JSON object"));
        };

        match fields.remove("message") {
            None | Some(Value::Null) => Ok(Self { message: None }),
            Some(Value::String(message)) => Ok(Self {
                message: Some(message),
            }),
            Some(_) => Err(ApiError::server_error("'message' must be a string")),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for ChatBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::server_error("failed to read request body"))?;

        Self::parse(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_message() {
        let body = ChatBody::parse(br#"{"message": "  I have a cold "}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("  I have a cold "));
    }

    #[test]
    fn test_missing_and_null_message() {
        assert_eq!(ChatBody::parse(b"{}").unwrap().message, None);
        assert_eq!(ChatBody::parse(br#"{"message": null}"#).unwrap().message, None);
    }

    #[test]
    fn test_non_string_message() {
        let err = ChatBody::parse(br#"{"message": 42}"#).unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.starts_with("Server error: "));
    }

    #[test]
    fn test_invalid_json() {
        let err = ChatBody::parse(b"message=hello").unwrap_err();
        assert_eq!(err.message, "Server error: request body is not valid JSON");
    }

    #[test]
    fn test_non_object_body() {
        let err = ChatBody::parse(b"[\"hello\"]").unwrap_err();
        assert_eq!(err.message, "Server error: request body must be a JSON object");
    }
}
