//! Core types and trait definitions for chord source resolution
//!
//! Every step of the chord source chain (tab-site extractors and the
//! generative fallback) implements [`ChordSource`]. Sources report failures as
//! [`ExtractionError`] internally; [`ChordSource::extract`] collapses them to
//! `None` so nothing ever propagates past the source boundary.

use crate::extractors::ultimate_guitar::is_ultimate_guitar_url;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use songbook_common::Song;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// Common Types
// ============================================================================

/// What a chord source is asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordQuery {
    /// Band or artist
    pub artist: String,
    /// Song title
    pub title: String,
    /// Best-effort source URL (absolute), if the song carries one
    pub source_url: Option<String>,
    /// First URL pointing at the Ultimate Guitar site, if any
    pub tab_url: Option<String>,
}

impl ChordQuery {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            source_url: None,
            tab_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if is_ultimate_guitar_url(&url) {
            self.tab_url = Some(url.clone());
        }
        self.source_url = Some(url);
        self
    }

    /// Query for a song
    ///
    /// `source_url` is the content URL, else the embed URL. `tab_url` is
    /// whichever of the two points at Ultimate Guitar, content first.
    pub fn for_song(song: &Song) -> Self {
        Self {
            artist: song.band.clone(),
            title: song.title.clone(),
            source_url: song_source_url(song).map(str::to_string),
            tab_url: song_url_fields(song)
                .find(|field| is_ultimate_guitar_url(field))
                .map(str::to_string),
        }
    }

    /// Parsed source URL
    pub fn url(&self) -> Option<Url> {
        self.source_url.as_deref().and_then(parse_absolute_url)
    }
}

/// Which step of the chain produced a chord sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Explicit manual chord column
    Manual,
    /// Inline text in the content column
    ManualLegacy,
    /// Songsterr search + chords page
    Songsterr,
    /// Ultimate Guitar tab page
    UltimateGuitar,
    /// Generative fallback
    Generated,
    /// Every step failed; text is the fixed failure message
    None,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provenance::Manual => "manual",
            Provenance::ManualLegacy => "manual_legacy",
            Provenance::Songsterr => "songsterr",
            Provenance::UltimateGuitar => "ultimate_guitar",
            Provenance::Generated => "generated",
            Provenance::None => "none",
        };
        f.write_str(name)
    }
}

/// Outcome of chord source resolution; `text` is never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResolution {
    pub text: String,
    pub provenance: Provenance,
}

// ============================================================================
// URL classification
// ============================================================================

/// Parse text as an absolute URL with a host
///
/// Structural check only; nothing is fetched.
pub fn parse_absolute_url(text: &str) -> Option<Url> {
    Url::parse(text.trim())
        .ok()
        .filter(|url| url.has_host())
}

/// Whether text is a well-formed absolute URL
pub fn is_well_formed_url(text: &str) -> bool {
    parse_absolute_url(text).is_some()
}

/// First of content/embed fields that is a well-formed URL
pub fn song_source_url(song: &Song) -> Option<&str> {
    song_url_fields(song).find(|field| is_well_formed_url(field))
}

fn song_url_fields(song: &Song) -> impl Iterator<Item = &str> {
    [song.content.as_str(), song.embed_url.as_str()]
        .into_iter()
        .map(str::trim)
}

// ============================================================================
// Chord Source Trait
// ============================================================================

/// One step of the chord source chain
#[async_trait]
pub trait ChordSource: Send + Sync {
    /// Provenance recorded when this source wins
    fn provenance(&self) -> Provenance;

    /// Whether the source can serve this query at all
    ///
    /// A source that does not apply is skipped without any network call.
    fn applies_to(&self, _query: &ChordQuery) -> bool {
        true
    }

    /// Fetch chord-sheet text in bracket notation
    async fn fetch(&self, query: &ChordQuery) -> Result<String, ExtractionError>;

    /// Fetch, collapsing every failure to `None`
    ///
    /// Blank text counts as no result.
    async fn extract(&self, query: &ChordQuery) -> Option<String> {
        match self.fetch(query).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(
                    source = %self.provenance(),
                    artist = %query.artist,
                    title = %query.title,
                    chars = text.len(),
                    "Chord source produced text"
                );
                Some(text)
            }
            Ok(_) => {
                warn!(source = %self.provenance(), title = %query.title, "Chord source returned blank text");
                None
            }
            Err(e) => {
                warn!(
                    source = %self.provenance(),
                    artist = %query.artist,
                    title = %query.title,
                    error = %e,
                    "Chord source failed"
                );
                None
            }
        }
    }
}

/// Chord source failure
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Unreachable host, connection reset, transport timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Structure present but not recognized
    #[error("Parse error: {0}")]
    Parse(String),

    /// No matching song or content
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query not serviceable by this source (e.g. foreign URL)
    #[error("Unsupported query: {0}")]
    Unsupported(String),

    /// Generative capability not configured
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Step exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<crate::http::TransportError> for ExtractionError {
    fn from(e: crate::http::TransportError) -> Self {
        ExtractionError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(content: &str, embed: &str) -> Song {
        Song {
            id: "1-T".to_string(),
            band: "B".to_string(),
            title: "T".to_string(),
            content: content.to_string(),
            youtube_url: String::new(),
            embed_url: embed.to_string(),
            manual_chords: None,
            raw_index: 1,
        }
    }

    #[test]
    fn test_url_well_formedness_is_structural() {
        assert!(is_well_formed_url("https://tabs.example.com/song"));
        assert!(is_well_formed_url("  http://localhost:8080/x "));
        assert!(!is_well_formed_url("[C]la la"));
        assert!(!is_well_formed_url("tabs.example.com/song"));
        assert!(!is_well_formed_url(""));
        // Parses, but has no host
        assert!(!is_well_formed_url("mailto:someone@example.com"));
    }

    #[test]
    fn test_song_source_url_prefers_content() {
        let s = song("https://a.test/1", "https://b.test/2");
        assert_eq!(song_source_url(&s), Some("https://a.test/1"));

        let s = song("[C]inline", "https://b.test/2");
        assert_eq!(song_source_url(&s), Some("https://b.test/2"));

        let s = song("[C]inline", "");
        assert_eq!(song_source_url(&s), None);
    }

    #[test]
    fn test_query_for_song() {
        let q = ChordQuery::for_song(&song("https://a.test/1", ""));
        assert_eq!(q.artist, "B");
        assert_eq!(q.url().map(|u| u.host_str().map(str::to_string)), Some(Some("a.test".to_string())));
        assert_eq!(q.tab_url, None);
    }

    #[test]
    fn test_tab_url_taken_from_embed_when_content_is_foreign() {
        let tab = "https://tabs.ultimate-guitar.com/tab/b/t-chords-1";
        let q = ChordQuery::for_song(&song("https://www.songsterr.com/a/wsa/b-t-s1", tab));
        assert_eq!(q.source_url.as_deref(), Some("https://www.songsterr.com/a/wsa/b-t-s1"));
        assert_eq!(q.tab_url.as_deref(), Some(tab));

        let q = ChordQuery::for_song(&song(tab, "https://tabs.ultimate-guitar.com/other"));
        assert_eq!(q.tab_url.as_deref(), Some(tab));
    }

    #[test]
    fn test_provenance_display_matches_serde() {
        for p in [
            Provenance::Manual,
            Provenance::ManualLegacy,
            Provenance::Songsterr,
            Provenance::UltimateGuitar,
            Provenance::Generated,
            Provenance::None,
        ] {
            assert_eq!(serde_json::to_value(p).unwrap(), p.to_string());
        }
    }
}
