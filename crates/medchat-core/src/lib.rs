//! # Medchat Core
//!
//! Core types and the inference gateway for the medical chat relay.
//!
//! This crate provides:
//! - The provider trait that abstracts the upstream inference server
//! - The error taxonomy shared by providers and the gateway
//! - The medical prompt template and generation request type
//! - The in-memory session log of successful exchanges
//! - The [`InferenceGateway`] that ties them together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gateway;
pub mod provider;
pub mod request;
pub mod session;

// Re-export commonly used types
pub use error::{ErrorKind, GatewayResult, GenerationError, ProviderError};
pub use gateway::{GenerationSettings, InferenceGateway, DEFAULT_MODEL};
pub use provider::InferenceProvider;
pub use request::{render_medical_prompt, GenerationRequest, DEFAULT_TEMPERATURE};
pub use session::{Exchange, SessionLog};
