//! Song catalog backed by the published spreadsheet
//!
//! The sheet is fetched as CSV export and replaces the in-memory list
//! wholesale on every reload.

use crate::http::{FetchRequest, HttpTransport};
use songbook_common::{sheet, Song};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Spreadsheet request failed: {0}")]
    Network(String),

    #[error("Spreadsheet returned status {0}")]
    Status(u16),
}

pub struct SongCatalog {
    transport: Arc<dyn HttpTransport>,
    spreadsheet_id: String,
    base_url: String,
    songs: RwLock<Vec<Song>>,
}

impl SongCatalog {
    pub fn new(transport: Arc<dyn HttpTransport>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            transport,
            spreadsheet_id: spreadsheet_id.into(),
            base_url: SHEETS_BASE_URL.to_string(),
            songs: RwLock::new(Vec::new()),
        }
    }

    /// Catalog preloaded with songs, no spreadsheet behind it until reload
    pub fn with_songs(transport: Arc<dyn HttpTransport>, spreadsheet_id: impl Into<String>, songs: Vec<Song>) -> Self {
        let catalog = Self::new(transport, spreadsheet_id);
        Self {
            songs: RwLock::new(songs),
            ..catalog
        }
    }

    /// CSV export URL; `cache_buster` defeats intermediate caches
    pub fn export_url(&self, cache_buster: i64) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:csv&_t={}",
            self.base_url, self.spreadsheet_id, cache_buster
        )
    }

    /// Refetch the sheet and replace the catalog; returns the song count
    ///
    /// On failure the previous catalog is kept.
    pub async fn reload(&self) -> Result<usize, CatalogError> {
        let url = self.export_url(chrono::Utc::now().timestamp_millis());

        let response = self
            .transport
            .fetch(FetchRequest::get(url))
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.is_success() {
            warn!(status = response.status, spreadsheet_id = %self.spreadsheet_id, "Spreadsheet fetch failed");
            return Err(CatalogError::Status(response.status));
        }

        let songs = sheet::songs_from_csv(&response.body);
        let count = songs.len();
        *self.songs.write().await = songs;

        info!(count, spreadsheet_id = %self.spreadsheet_id, "Song catalog reloaded");
        Ok(count)
    }

    pub async fn all(&self) -> Vec<Song> {
        self.songs.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Song> {
        self.songs.read().await.iter().find(|s| s.id == id).cloned()
    }

    /// Songs whose band or title contains `query` (case-insensitive)
    pub async fn search(&self, query: &str) -> Vec<Song> {
        self.songs
            .read()
            .await
            .iter()
            .filter(|s| s.matches(query))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;

    const CSV: &str = "Zespół,Tytuł,YT,Tekst,Embed,Akordy,Akordy2\n\
                       Oasis,Wonderwall,,https://tabs.ultimate-guitar.com/tab/1,,,\n\
                       ,Hej Sokoły,,\"[C]Hej, tam\",,,\n";

    #[tokio::test]
    async fn test_reload_replaces_songs() {
        let transport = Arc::new(MockTransport::new().respond(SHEETS_BASE_URL, 200, CSV));
        let catalog = SongCatalog::new(transport.clone(), "sheet-id");

        assert_eq!(catalog.reload().await.unwrap(), 2);

        let url = &transport.urls()[0];
        assert!(url.starts_with("https://docs.google.com/spreadsheets/d/sheet-id/gviz/tq?tqx=out:csv&_t="));

        let songs = catalog.all().await;
        assert_eq!(songs[0].id, "0-Wonderwall");
        assert_eq!(songs[1].band, sheet::UNKNOWN_BAND);
        assert_eq!(songs[1].content, "[C]Hej, tam");

        assert!(catalog.find("1-Hej Sokoły").await.is_some());
        assert!(catalog.find("9-Nope").await.is_none());
        assert_eq!(catalog.search("oasis").await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_catalog() {
        let transport = Arc::new(MockTransport::new().respond(SHEETS_BASE_URL, 500, "boom"));
        let existing = vec![Song {
            id: "1-A".to_string(),
            band: "B".to_string(),
            title: "A".to_string(),
            content: String::new(),
            youtube_url: String::new(),
            embed_url: String::new(),
            manual_chords: None,
            raw_index: 1,
        }];
        let catalog = SongCatalog::with_songs(transport, "sheet-id", existing);

        assert!(matches!(catalog.reload().await, Err(CatalogError::Status(500))));
        assert_eq!(catalog.all().await.len(), 1);
    }
}
