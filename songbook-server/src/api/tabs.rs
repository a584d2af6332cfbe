//! Direct tab-site endpoints
//!
//! Run a single extractor outside the resolver chain.
//!
//! - `POST /fetch-tabs` `{"url": ...}` → Ultimate Guitar page
//! - `POST /fetch-songsterr` `{"artist": ..., "title": ...}` → Songsterr search

use crate::extractors::ultimate_guitar::is_ultimate_guitar_url;
use crate::types::{ChordQuery, ChordSource, Provenance};
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FetchTabsRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchSongsterrRequest {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractedSheet {
    pub content: String,
    pub provenance: Provenance,
}

/// POST /fetch-tabs
///
/// **Errors:**
/// - 400: URL missing or not on Ultimate Guitar
/// - 404: page fetched but nothing extracted (or fetch failed)
pub async fn fetch_tabs(
    State(state): State<AppState>,
    Json(payload): Json<FetchTabsRequest>,
) -> ApiResult<Json<ExtractedSheet>> {
    let url = payload.url.trim();
    if !is_ultimate_guitar_url(url) {
        return Err(ApiError::BadRequest(
            "url must be an absolute Ultimate Guitar URL".to_string(),
        ));
    }

    let query = ChordQuery::default().with_url(url);
    extracted(state.ultimate_guitar.as_ref(), &query).await
}

/// POST /fetch-songsterr
///
/// **Errors:**
/// - 400: artist or title missing
/// - 404: no match or no chord sheet on the page
pub async fn fetch_songsterr(
    State(state): State<AppState>,
    Json(payload): Json<FetchSongsterrRequest>,
) -> ApiResult<Json<ExtractedSheet>> {
    let artist = payload.artist.trim();
    let title = payload.title.trim();
    if artist.is_empty() || title.is_empty() {
        return Err(ApiError::BadRequest(
            "artist and title are required".to_string(),
        ));
    }

    let query = ChordQuery::new(artist, title);
    extracted(state.songsterr.as_ref(), &query).await
}

async fn extracted(source: &dyn ChordSource, query: &ChordQuery) -> ApiResult<Json<ExtractedSheet>> {
    match source.extract(query).await {
        Some(content) => Ok(Json(ExtractedSheet {
            content,
            provenance: source.provenance(),
        })),
        None => Err(ApiError::NotFound(format!(
            "No chord sheet extracted from {}",
            source.provenance()
        ))),
    }
}

/// Build tab routes
pub fn tab_routes() -> Router<AppState> {
    Router::new()
        .route("/fetch-tabs", post(fetch_tabs))
        .route("/fetch-songsterr", post(fetch_songsterr))
}
