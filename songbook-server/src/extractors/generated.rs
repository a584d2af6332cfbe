//! Generative chord source
//!
//! Last step of the chain: asks the text generator for lyrics with bracket
//! chords, pointing it at the song's source URL when there is one.

use crate::generative::prompts::chords_prompt;
use crate::generative::{GenerationError, TextGenerator};
use crate::types::{ChordQuery, ChordSource, ExtractionError, Provenance};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct GeneratedChordSource {
    generator: Arc<dyn TextGenerator>,
}

impl GeneratedChordSource {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ChordSource for GeneratedChordSource {
    fn provenance(&self) -> Provenance {
        Provenance::Generated
    }

    async fn fetch(&self, query: &ChordQuery) -> Result<String, ExtractionError> {
        info!(artist = %query.artist, title = %query.title, "Falling back to generated chords");

        let prompt = chords_prompt(
            &query.artist,
            &query.title,
            query.source_url.as_deref().unwrap_or(""),
        );

        self.generator
            .generate(&prompt)
            .await
            .map(|text| text.trim().to_string())
            .map_err(|e| match e {
                GenerationError::Unavailable(msg) => ExtractionError::CapabilityUnavailable(msg),
                GenerationError::Network(msg) => ExtractionError::Network(msg),
                GenerationError::Api(msg) => ExtractionError::Parse(msg),
                GenerationError::Empty => {
                    ExtractionError::NotFound("Generator returned no text".to_string())
                }
            })
    }
}
