//! # Medchat Providers
//!
//! Upstream inference provider implementations for the medical chat relay.
//!
//! Currently the only upstream is a local Ollama daemon.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
