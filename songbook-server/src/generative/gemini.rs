//! Gemini `generateContent` client
//!
//! # API Reference
//! - Endpoint: `{base}/models/{model}:generateContent?key={api_key}`
//! - Request: `{"contents":[{"parts":[{"text": prompt}]}]}`
//! - Response: text parts under `candidates[0].content.parts`
//!
//! Thinking is disabled (`thinkingBudget: 0`); tips and chord sheets do not
//! benefit from it and it multiplies latency.

use super::{GenerationError, TextGenerator};
use crate::http::{FetchRequest, HttpTransport};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use songbook_common::config::GeminiConfig;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini client
pub struct GeminiClient {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Client for a resolved API key; `None` makes every call `Unavailable`
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: Option<String>, config: &GeminiConfig) -> Self {
        Self {
            transport,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::Unavailable("Gemini API key not configured".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling Gemini");

        let response = self
            .transport
            .fetch(FetchRequest::post_json(url, &body))
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(GenerationError::Api(format!(
                "Gemini returned status {}: {}",
                response.status,
                response.body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::Api(format!("Failed to parse Gemini response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}
