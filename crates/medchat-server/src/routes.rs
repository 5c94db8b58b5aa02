//! Route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

use crate::{handlers, middleware, state::AppState};

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat UI
        .route("/", get(handlers::index))
        // Chat
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::history))
        // Diagnostics
        .route("/health", get(handlers::health_check))
        .route("/test-ollama", get(handlers::test_ollama))
        // Apply middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(middleware::set_request_id_layer())
                .layer(middleware::trace_layer())
                .layer(middleware::propagate_request_id_layer())
                .layer(middleware::cors_layer())
                .layer(middleware::catch_panic_layer()),
        )
        // Add state
        .with_state(state)
}
