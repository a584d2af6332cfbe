//! Song catalog endpoints
//!
//! - `GET /songs?q=` list or search
//! - `POST /songs/reload` refetch the spreadsheet
//! - `GET /songs/:id` one song
//! - `GET /songs/:id/chords?layout=&format=` resolved and rendered chord sheet
//! - `GET /songs/:id/insight` playing tips

use crate::types::Provenance;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songbook_common::notation::parse_sheet;
use songbook_common::{ChordSheetRenderer, LayoutMode, RenderableLine, Song};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SongListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub song_count: usize,
}

/// Query parameters for the chords endpoint
#[derive(Debug, Deserialize)]
pub struct ChordsQuery {
    /// `inline` or `stacked`; server default when absent
    pub layout: Option<String>,
    /// `json` (default) or `text`
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChordsResponse {
    pub song_id: String,
    pub provenance: Provenance,
    pub layout: LayoutMode,
    /// Resolved bracket-notation text
    pub text: String,
    pub lines: Vec<RenderableLine>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub song_id: String,
    pub insight: String,
}

/// GET /songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongListQuery>,
) -> Json<Vec<Song>> {
    let songs = match query.q.as_deref() {
        Some(q) => state.catalog.search(q).await,
        None => state.catalog.all().await,
    };
    Json(songs)
}

/// POST /songs/reload
pub async fn reload_songs(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    match state.catalog.reload().await {
        Ok(song_count) => Ok(Json(ReloadResponse { song_count })),
        Err(e) => {
            warn!(error = %e, "Catalog reload failed");
            state.record_error(e.to_string()).await;
            Err(e.into())
        }
    }
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    find_song(&state, &id).await.map(Json)
}

/// GET /songs/:id/chords
pub async fn get_chords(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChordsQuery>,
) -> ApiResult<Response> {
    let layout = match query.layout.as_deref() {
        Some(name) => name.parse::<LayoutMode>()?,
        None => state.default_layout,
    };
    let as_text = match query.format.as_deref() {
        None | Some("json") => false,
        Some("text") => true,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown format '{}' (expected json or text)",
                other
            )))
        }
    };

    let song = find_song(&state, &id).await?;
    let resolution = state.chords.resolve(&song).await;

    let renderer = ChordSheetRenderer::new(layout);
    let parsed = parse_sheet(&resolution.text);
    info!(song_id = %song.id, provenance = %resolution.provenance, layout = ?layout, "Chords served");

    if as_text {
        let body = renderer.render_text(&parsed);
        return Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response());
    }

    Ok(Json(ChordsResponse {
        song_id: song.id,
        provenance: resolution.provenance,
        layout,
        lines: renderer.render(&parsed),
        text: resolution.text,
    })
    .into_response())
}

/// GET /songs/:id/insight
pub async fn get_insight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<InsightResponse>> {
    let song = find_song(&state, &id).await?;
    let insight = state
        .insight
        .resolve(&song.band, &song.title, &song.content)
        .await;

    Ok(Json(InsightResponse {
        song_id: song.id,
        insight,
    }))
}

pub(crate) async fn find_song(state: &AppState, id: &str) -> ApiResult<Song> {
    state
        .catalog
        .find(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Song '{}'", id)))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(list_songs))
        .route("/songs/reload", post(reload_songs))
        .route("/songs/:id", get(get_song))
        .route("/songs/:id/chords", get(get_chords))
        .route("/songs/:id/insight", get(get_insight))
}
