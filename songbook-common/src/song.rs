//! Song model
//!
//! One row of the spreadsheet feed. Songs are immutable once loaded; a reload
//! replaces the whole list.

use serde::{Deserialize, Serialize};

/// A song from the spreadsheet feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Stable identifier (`"{row index}-{title}"`)
    pub id: String,
    /// Performing band or artist
    pub band: String,
    /// Song title
    pub title: String,
    /// Inline chord/lyric text, or a source URL
    pub content: String,
    /// YouTube link, carried through verbatim
    pub youtube_url: String,
    /// Alternate external reference
    pub embed_url: String,
    /// Pre-authored chord sheet, highest priority when present
    pub manual_chords: Option<String>,
    /// Row index in the sheet (header excluded)
    pub raw_index: usize,
}

impl Song {
    /// Manual chord sheet if it carries any text
    pub fn manual_override(&self) -> Option<&str> {
        self.manual_chords
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Case-insensitive match against band or title
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.band.to_lowercase().contains(&query) || self.title.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(manual: Option<&str>) -> Song {
        Song {
            id: "0-Wonderwall".to_string(),
            band: "Oasis".to_string(),
            title: "Wonderwall".to_string(),
            content: String::new(),
            youtube_url: String::new(),
            embed_url: String::new(),
            manual_chords: manual.map(str::to_string),
            raw_index: 0,
        }
    }

    #[test]
    fn test_manual_override_ignores_blank_text() {
        assert_eq!(song(None).manual_override(), None);
        assert_eq!(song(Some("  \n ")).manual_override(), None);
        assert_eq!(song(Some("[Em7]Today")).manual_override(), Some("[Em7]Today"));
    }

    #[test]
    fn test_matches_band_or_title() {
        let s = song(None);
        assert!(s.matches("oasis"));
        assert!(s.matches("WONDER"));
        assert!(s.matches(""));
        assert!(!s.matches("blur"));
    }
}
