//! Generative text capability
//!
//! The chord fallback and the insight tips both ask a text-generation model
//! for plain text. The model sits behind [`TextGenerator`]; [`GeminiClient`]
//! is the production implementation.

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Generation failure
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential configured
    #[error("Generative capability unavailable: {0}")]
    Unavailable(String),

    /// Request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx or malformed response
    #[error("API error: {0}")]
    Api(String),

    /// Response carried no text
    #[error("Empty response")]
    Empty,
}

/// Opaque text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
