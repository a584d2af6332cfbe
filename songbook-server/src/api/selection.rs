//! Current selection endpoints
//!
//! Selecting returns immediately with a pending snapshot; clients poll
//! `GET /selection` until both halves are ready.

use super::songs::find_song;
use crate::services::SelectionSnapshot;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// POST /selection/:id
pub async fn select_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<SelectionSnapshot>)> {
    let song = find_song(&state, &id).await?;
    // Resolution continues in the background
    let _ = state.selection.select(song).await;

    Ok((StatusCode::ACCEPTED, Json(state.selection.current().await)))
}

/// GET /selection
pub async fn current_selection(State(state): State<AppState>) -> Json<SelectionSnapshot> {
    Json(state.selection.current().await)
}

/// Build selection routes
pub fn selection_routes() -> Router<AppState> {
    Router::new()
        .route("/selection", get(current_selection))
        .route("/selection/:id", post(select_song))
}
