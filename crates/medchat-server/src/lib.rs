//! # Medchat Server
//!
//! HTTP surface for the medical chat relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The chat, history, and diagnostic endpoints
//! - Request-id, tracing, CORS, and panic-recovery layers
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::{Server, ServerConfig};
pub use shutdown::shutdown_signal;
pub use state::AppState;
