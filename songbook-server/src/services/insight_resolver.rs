//! Insight Resolver
//!
//! Short playing tips for a song from the text generator. Always returns
//! displayable text.

use crate::generative::prompts::insight_prompt;
use crate::generative::{GenerationError, TextGenerator};
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when generation fails
pub const INSIGHT_UNAVAILABLE: &str =
    "Nie udało się pobrać wskazówek.\nSpróbuj ponownie później.\nZagraj to po swojemu!";

/// Shown when no API key is configured
pub const INSIGHT_NOT_CONFIGURED: &str = "Skonfiguruj klucz API Gemini, aby otrzymać wskazówki.";

const BULLET_MARKERS: &[char] = &['*', '-', '•'];

pub struct InsightResolver {
    generator: Arc<dyn TextGenerator>,
}

impl InsightResolver {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Tips for a song, `context` being its lyrics or chord text
    pub async fn resolve(&self, band: &str, title: &str, context: &str) -> String {
        let prompt = insight_prompt(band, title, context);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let tips = clean_tips(&text);
                if tips.is_empty() {
                    warn!(band, title, "Insight had no usable lines");
                    return INSIGHT_UNAVAILABLE.to_string();
                }
                info!(band, title, "Insight generated");
                tips
            }
            Err(GenerationError::Unavailable(msg)) => {
                warn!(band, title, error = %msg, "Insight skipped");
                INSIGHT_NOT_CONFIGURED.to_string()
            }
            Err(e) => {
                warn!(band, title, error = %e, "Insight generation failed");
                INSIGHT_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Trim lines, strip leading bullets, drop empty lines
pub fn clean_tips(text: &str) -> String {
    text.lines()
        .map(|line| line.trim().trim_start_matches(BULLET_MARKERS).trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
