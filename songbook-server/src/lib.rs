//! songbook-server library interface
//!
//! Exposes the chord pipeline, services and router for integration testing

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod generative;
pub mod http;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use extractors::{GeneratedChordSource, SongsterrClient, UltimateGuitarClient};
use generative::TextGenerator;
use http::HttpTransport;
use services::{ChordSourceResolver, InsightResolver, SongCatalog, SongSelection};
use songbook_common::config::SongbookConfig;
use songbook_common::LayoutMode;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use types::ChordSource;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Songs from the spreadsheet feed
    pub catalog: Arc<SongCatalog>,
    /// Full chord source chain
    pub chords: Arc<ChordSourceResolver>,
    /// Playing tips
    pub insight: Arc<InsightResolver>,
    /// Currently selected song
    pub selection: Arc<SongSelection>,
    /// Direct access for the search-by-name endpoint
    pub songsterr: Arc<SongsterrClient>,
    /// Direct access for the fetch-by-URL endpoint
    pub ultimate_guitar: Arc<UltimateGuitarClient>,
    /// Layout used when a request does not pick one
    pub default_layout: LayoutMode,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Wire every service over one transport and one text generator
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        generator: Arc<dyn TextGenerator>,
        config: &SongbookConfig,
    ) -> Self {
        let songsterr = Arc::new(SongsterrClient::new(transport.clone()));
        let ultimate_guitar = Arc::new(UltimateGuitarClient::new(transport.clone()));

        let sources: Vec<Arc<dyn ChordSource>> = vec![
            songsterr.clone() as Arc<dyn ChordSource>,
            ultimate_guitar.clone() as Arc<dyn ChordSource>,
            Arc::new(GeneratedChordSource::new(generator.clone())),
        ];
        let chords = Arc::new(
            ChordSourceResolver::new(sources).with_step_timeout(config.fetch.step_timeout()),
        );
        let insight = Arc::new(InsightResolver::new(generator));
        let selection = Arc::new(SongSelection::new(chords.clone(), insight.clone()));

        Self {
            catalog: Arc::new(SongCatalog::new(transport, config.spreadsheet_id.clone())),
            chords,
            insight,
            selection,
            songsterr,
            ultimate_guitar,
            default_layout: config.layout,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Record an error for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::song_routes())
        .merge(api::selection_routes())
        .merge(api::tab_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
