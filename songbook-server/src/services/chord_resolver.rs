//! Chord Source Resolver
//!
//! Decides where a song's chord sheet comes from. Order:
//! 1. manual chord column (verbatim, no network)
//! 2. inline text in the content column (verbatim, no network)
//! 3. each configured [`ChordSource`] in turn, bounded by a per-step timeout
//! 4. fixed failure message
//!
//! The result text is never empty.

use crate::types::{is_well_formed_url, ChordQuery, ChordSource, ExtractionError, Provenance, SourceResolution};
use songbook_common::Song;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Text returned when every step fails
pub const CHORDS_UNAVAILABLE: &str = "Nie udało się pobrać tekstu. Spróbuj odświeżyć.";

/// Default per-step budget
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(20);

pub struct ChordSourceResolver {
    sources: Vec<Arc<dyn ChordSource>>,
    step_timeout: Duration,
}

impl ChordSourceResolver {
    /// Resolver over `sources`, tried in the given order
    pub fn new(sources: Vec<Arc<dyn ChordSource>>) -> Self {
        Self {
            sources,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Resolve the chord sheet for a song
    pub async fn resolve(&self, song: &Song) -> SourceResolution {
        if let Some(manual) = song.manual_override() {
            return self.finish(song, manual.to_string(), Provenance::Manual);
        }

        let content = song.content.trim();
        if !content.is_empty() && !is_well_formed_url(content) {
            return self.finish(song, song.content.clone(), Provenance::ManualLegacy);
        }

        let query = ChordQuery::for_song(song);
        for source in &self.sources {
            let provenance = source.provenance();
            if !source.applies_to(&query) {
                debug!(song_id = %song.id, source = %provenance, "Source does not apply, skipping");
                continue;
            }

            match tokio::time::timeout(self.step_timeout, source.extract(&query)).await {
                Ok(Some(text)) => return self.finish(song, text, provenance),
                Ok(None) => {}
                Err(_) => {
                    let error = ExtractionError::Timeout(self.step_timeout);
                    warn!(song_id = %song.id, source = %provenance, error = %error, "Chord source step failed");
                }
            }
        }

        self.finish(song, CHORDS_UNAVAILABLE.to_string(), Provenance::None)
    }

    fn finish(&self, song: &Song, text: String, provenance: Provenance) -> SourceResolution {
        info!(song_id = %song.id, provenance = %provenance, chars = text.len(), "Chord sheet resolved");
        SourceResolution { text, provenance }
    }
}
