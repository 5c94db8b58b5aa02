//! # Medchat Telemetry
//!
//! Structured logging for the medical chat relay, built on `tracing`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

pub use logging::{init_logging, LoggingConfig, LoggingError};
