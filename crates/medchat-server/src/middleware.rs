//! Tower layers applied to every route.

use std::any::Any;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::error::ApiError;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assign a UUID request id when the client did not send one
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid)
}

/// Echo the request id on the response
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER))
}

/// Span constructor used by [`trace_layer`]
pub type MakeSpanFn = fn(&Request<Body>) -> Span;

/// One span per request, tagged with method, path, and request id
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpanFn> {
    TraceLayer::new_for_http().make_span_with(make_request_span as MakeSpanFn)
}

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// The chat page may be served from another origin during development
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Turn a handler panic into `500 { "error": "Server error: ..." }`
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::server_error("internal failure while handling the request").into_response()
}
