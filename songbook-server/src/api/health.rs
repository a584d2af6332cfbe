//! Liveness and catalog readiness
//!
//! The service is "degraded" rather than down while no songs are loaded: the
//! tab-site endpoints still work, only the songbook itself is empty.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

const SERVICE_NAME: &str = "songbook";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// Catalog empty, typically after a failed sheet load
    Degraded,
}

impl HealthStatus {
    fn for_catalog(song_count: usize) -> Self {
        if song_count == 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub module: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub song_count: usize,
    /// Most recent catalog or upstream failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let song_count = state.catalog.all().await.len();

    Json(HealthResponse {
        status: HealthStatus::for_catalog(song_count),
        module: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: Utc::now()
            .signed_duration_since(state.startup_time)
            .num_seconds()
            .max(0) as u64,
        song_count,
        last_error: state.last_error.read().await.clone(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
