//! Songsterr chord source (search-by-name)
//!
//! Finds a song by free-text search, then scrapes its server-rendered chords
//! page.
//!
//! # Flow
//! 1. `GET {base}/api/songs?pattern=<artist title>` → JSON match list
//! 2. Pick the first match flagged `hasChords`, else the first match
//! 3. `GET {base}/a/wsa/{slug}-chords-s{songId}`; only the numeric id matters
//!    to the site, the slug is cosmetic
//! 4. Locate the chord container by chord-span density and convert it to
//!    bracket notation
//!
//! Results of 50 characters or fewer are treated as failures.

use crate::extractors::locator::{locate_first, ChordSpanLocator, ContentLocator};
use crate::http::{FetchRequest, HttpTransport};
use crate::types::{ChordQuery, ChordSource, ExtractionError, Provenance};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Songsterr site root
const SONGSTERR_BASE_URL: &str = "https://www.songsterr.com";

/// Extracted text must be longer than this
const MIN_SHEET_CHARS: usize = 50;

/// One entry of the Songsterr search response
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SongsterrMatch {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    pub song_id: u64,
    #[serde(default)]
    pub has_chords: bool,
}

/// Songsterr client
pub struct SongsterrClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    locators: Vec<Box<dyn ContentLocator>>,
}

impl SongsterrClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_base_url(transport, SONGSTERR_BASE_URL)
    }

    /// Client against a different site root (mirrors, tests)
    pub fn with_base_url(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            locators: vec![Box::new(ChordSpanLocator::new(MIN_SHEET_CHARS))],
        }
    }

    /// Search songs by free text
    pub async fn search(&self, pattern: &str) -> Result<Vec<SongsterrMatch>, ExtractionError> {
        let url = format!(
            "{}/api/songs?pattern={}",
            self.base_url,
            urlencoding::encode(pattern)
        );
        debug!(pattern = %pattern, url = %url, "Searching Songsterr");

        let response = self.transport.fetch(FetchRequest::get(&url)).await?;
        if !response.is_success() {
            return Err(ExtractionError::Status {
                status: response.status,
                url,
            });
        }

        response
            .json()
            .map_err(|e| ExtractionError::Parse(format!("Songsterr search response: {}", e)))
    }

    /// Canonical chords page for a match
    pub fn chords_page_url(&self, song: &SongsterrMatch) -> String {
        format!(
            "{}/a/wsa/{}-chords-s{}",
            self.base_url,
            slugify(&format!("{}-{}", song.artist, song.title)),
            song.song_id
        )
    }
}

/// First match with chords, else the first match
pub fn select_match(matches: &[SongsterrMatch]) -> Option<&SongsterrMatch> {
    matches
        .iter()
        .find(|m| m.has_chords)
        .or_else(|| matches.first())
}

/// Lowercase, non-alphanumeric runs to `-`, no leading/trailing `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[async_trait]
impl ChordSource for SongsterrClient {
    fn provenance(&self) -> Provenance {
        Provenance::Songsterr
    }

    fn applies_to(&self, query: &ChordQuery) -> bool {
        !query.artist.trim().is_empty() || !query.title.trim().is_empty()
    }

    async fn fetch(&self, query: &ChordQuery) -> Result<String, ExtractionError> {
        let pattern = format!("{} {}", query.artist, query.title);
        let matches = self.search(pattern.trim()).await?;

        let song = select_match(&matches).ok_or_else(|| {
            ExtractionError::NotFound(format!("No Songsterr match for '{}'", pattern.trim()))
        })?;

        let url = self.chords_page_url(song);
        info!(
            artist = %song.artist,
            title = %song.title,
            song_id = song.song_id,
            url = %url,
            "Fetching Songsterr chords page"
        );

        let response = self.transport.fetch(FetchRequest::get(&url)).await?;
        if !response.is_success() {
            return Err(ExtractionError::Status {
                status: response.status,
                url,
            });
        }

        locate_first(&self.locators, &response.body).ok_or_else(|| {
            ExtractionError::Parse(format!("No chord sheet found on {}", url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;

    fn m(id: u64, has_chords: bool) -> SongsterrMatch {
        SongsterrMatch {
            artist: "A".to_string(),
            title: "T".to_string(),
            song_id: id,
            has_chords,
        }
    }

    #[test]
    fn test_select_match_prefers_chords() {
        let matches = [m(1, false), m(2, true), m(3, true)];
        assert_eq!(select_match(&matches).map(|s| s.song_id), Some(2));

        let matches = [m(1, false), m(2, false)];
        assert_eq!(select_match(&matches).map(|s| s.song_id), Some(1));

        assert_eq!(select_match(&[]), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Guns N' Roses-Knockin' On Heaven's Door"), "guns-n-roses-knockin-on-heaven-s-door");
        assert_eq!(slugify("  --Dżem--Whisky!! "), "d-em-whisky");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_search_response_deserializes() {
        let body = r#"[{"songId":269,"artist":"Oasis","title":"Wonderwall","hasChords":true,"hasPlayer":true},
                      {"songId":7,"artist":"Oasis","title":"Live"}]"#;
        let parsed: Vec<SongsterrMatch> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed[0].song_id, 269);
        assert!(parsed[0].has_chords);
        assert!(!parsed[1].has_chords);
    }

    #[test]
    fn test_chords_page_url() {
        let client = SongsterrClient::new(Arc::new(MockTransport::new()));
        let song = SongsterrMatch {
            artist: "Oasis".to_string(),
            title: "Wonderwall".to_string(),
            song_id: 269,
            has_chords: true,
        };
        assert_eq!(
            client.chords_page_url(&song),
            "https://www.songsterr.com/a/wsa/oasis-wonderwall-chords-s269"
        );
    }

    #[test]
    fn test_applies_only_with_a_name() {
        let client = SongsterrClient::new(Arc::new(MockTransport::new()));
        assert!(client.applies_to(&ChordQuery::new("Oasis", "")));
        assert!(!client.applies_to(&ChordQuery::new(" ", "")));
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found() {
        let transport = Arc::new(MockTransport::new().respond("https://www.songsterr.com/api/songs", 200, "[]"));
        let client = SongsterrClient::new(transport.clone());

        let err = client.fetch(&ChordQuery::new("Nobody", "Nothing")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NotFound(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_search_query_is_url_encoded() {
        let transport = Arc::new(MockTransport::new());
        let client = SongsterrClient::new(transport.clone());

        assert_eq!(client.extract(&ChordQuery::new("Dżem", "Whisky & Co")).await, None);
        assert_eq!(
            transport.urls(),
            ["https://www.songsterr.com/api/songs?pattern=D%C5%BCem%20Whisky%20%26%20Co"]
        );
    }
}
