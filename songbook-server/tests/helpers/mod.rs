//! Test Helper Utilities
//!
//! Shared utilities for testing songbook-server: scripted network, a fake
//! text generator and page fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use songbook_common::config::SongbookConfig;
use songbook_server::generative::{GenerationError, TextGenerator};
use songbook_server::http::mock::MockTransport;
use songbook_server::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SHEET_CSV: &str = include_str!("../fixtures/songbook.csv");
pub const SONGSTERR_SEARCH_JSON: &str = include_str!("../fixtures/songsterr_search.json");
pub const SONGSTERR_CHORDS_HTML: &str = include_str!("../fixtures/songsterr_chords.html");
pub const UG_TAB_HTML: &str = include_str!("../fixtures/ug_tab.html");

pub const SHEETS_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";
pub const SONGSTERR_SEARCH_PREFIX: &str = "https://www.songsterr.com/api/songs";
pub const SONGSTERR_CHORDS_URL: &str = "https://www.songsterr.com/a/wsa/oasis-wonderwall-chords-s269";
pub const UG_WONDERWALL_URL: &str =
    "https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-27596";
pub const GEMINI_PREFIX: &str = "https://generativelanguage.googleapis.com/";

/// Song ids in [`SHEET_CSV`]
pub const WONDERWALL_ID: &str = "0-Wonderwall";
pub const WHISKY_ID: &str = "1-Whisky";
pub const AUTOBIOGRAFIA_ID: &str = "2-Autobiografia";
pub const NO_BAND_ID: &str = "3-Bez Zespołu";

/// Transport answering the spreadsheet only
pub fn sheet_transport() -> MockTransport {
    MockTransport::new().respond(SHEETS_PREFIX, 200, SHEET_CSV)
}

/// Spreadsheet plus working Songsterr and Ultimate Guitar pages
pub fn full_transport() -> MockTransport {
    sheet_transport()
        .respond(SONGSTERR_SEARCH_PREFIX, 200, SONGSTERR_SEARCH_JSON)
        .respond(SONGSTERR_CHORDS_URL, 200, SONGSTERR_CHORDS_HTML)
        .respond(UG_WONDERWALL_URL, 200, UG_TAB_HTML)
}

/// Text generator with a canned answer that records prompts
pub struct FakeGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Behaves like a client without an API key
    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| GenerationError::Unavailable("no key".to_string()))
    }
}

/// Config with a short per-step timeout
pub fn test_config() -> SongbookConfig {
    let mut config = SongbookConfig::default();
    config.spreadsheet_id = "test-sheet".to_string();
    config.fetch.step_timeout_secs = 2;
    config
}

/// App state over scripted network, catalog already loaded
pub async fn test_app_state(
    transport: Arc<MockTransport>,
    generator: Arc<FakeGenerator>,
) -> AppState {
    let state = AppState::new(transport, generator, &test_config());
    state
        .catalog
        .reload()
        .await
        .expect("fixture sheet loads");
    state
}
