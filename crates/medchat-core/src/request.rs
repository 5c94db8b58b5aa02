//! Generation request and the medical prompt template.

use serde::{Deserialize, Serialize};

/// Sampling temperature used for every medical answer
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const PROMPT_PREAMBLE: &str = "You are a helpful medical information assistant. \
Please provide informative, accurate responses about health topics, but always remind users \
that this is for educational purposes only and they should consult healthcare professionals \
for medical advice.";

const PROMPT_CLOSING: &str =
    "Please provide a helpful response and include a disclaimer about consulting healthcare professionals.";

/// Embed the user's question, verbatim, into the medical assistant framing.
#[must_use]
pub fn render_medical_prompt(user_text: &str) -> String {
    format!("{PROMPT_PREAMBLE}\n\nUser question: {user_text}\n\n{PROMPT_CLOSING}")
}

/// A single non-streaming generation call. Built per call and not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model to generate with (e.g., "llama3.2:3b")
    pub model: String,
    /// Fully rendered prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationRequest {
    /// Build a request for `user_text` using the medical prompt template
    pub fn medical(model: impl Into<String>, user_text: &str, temperature: f32) -> Self {
        Self {
            model: model.into(),
            prompt: render_medical_prompt(user_text),
            temperature,
        }
    }
}
