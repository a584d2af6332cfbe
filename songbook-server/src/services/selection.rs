//! Current song selection
//!
//! Selecting a song starts chord and insight resolution concurrently. A newer
//! selection cancels the older one; results are written only while their
//! generation is still current, so a slow answer for song A can never land
//! after song B was picked.

use super::chord_resolver::ChordSourceResolver;
use super::insight_resolver::InsightResolver;
use crate::types::SourceResolution;
use serde::Serialize;
use songbook_common::Song;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Resolution state of one half of a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Slot<T> {
    Pending,
    Ready(T),
}

impl<T> Slot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }
}

/// What the holder currently reflects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub generation: u64,
    pub song_id: Option<String>,
    pub chords: Slot<SourceResolution>,
    pub insight: Slot<String>,
}

impl SelectionSnapshot {
    fn empty() -> Self {
        Self {
            generation: 0,
            song_id: None,
            chords: Slot::Pending,
            insight: Slot::Pending,
        }
    }
}

pub struct SongSelection {
    chords: Arc<ChordSourceResolver>,
    insight: Arc<InsightResolver>,
    generation: Arc<AtomicU64>,
    state: Arc<RwLock<SelectionSnapshot>>,
    active: Mutex<Option<CancellationToken>>,
}

impl SongSelection {
    pub fn new(chords: Arc<ChordSourceResolver>, insight: Arc<InsightResolver>) -> Self {
        Self {
            chords,
            insight,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(SelectionSnapshot::empty())),
            active: Mutex::new(None),
        }
    }

    /// Select a song, superseding any in-flight selection
    ///
    /// The returned handle completes once both halves are written or the
    /// selection is cancelled.
    pub async fn select(&self, song: Song) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let token = CancellationToken::new();
        if let Some(previous) = self.replace_token(token.clone()) {
            previous.cancel();
        }

        {
            let mut state = self.state.write().await;
            *state = SelectionSnapshot {
                generation,
                song_id: Some(song.id.clone()),
                chords: Slot::Pending,
                insight: Slot::Pending,
            };
        }
        info!(song_id = %song.id, generation, "Song selected");

        let chords = self.chords.clone();
        let insight = self.insight.clone();
        let state = self.state.clone();
        let current = self.generation.clone();

        tokio::spawn(async move {
            let chords_half = async {
                let resolution = chords.resolve(&song).await;
                let mut snapshot = state.write().await;
                if current.load(Ordering::SeqCst) == generation {
                    snapshot.chords = Slot::Ready(resolution);
                }
            };

            let insight_half = async {
                let tips = insight.resolve(&song.band, &song.title, &song.content).await;
                let mut snapshot = state.write().await;
                if current.load(Ordering::SeqCst) == generation {
                    snapshot.insight = Slot::Ready(tips);
                }
            };

            tokio::select! {
                _ = token.cancelled() => {
                    debug!(song_id = %song.id, generation, "Selection superseded");
                }
                _ = async { tokio::join!(chords_half, insight_half) } => {
                    debug!(song_id = %song.id, generation, "Selection resolved");
                }
            }
        })
    }

    /// Snapshot of the current selection
    pub async fn current(&self) -> SelectionSnapshot {
        self.state.read().await.clone()
    }

    fn replace_token(&self, token: CancellationToken) -> Option<CancellationToken> {
        // A poisoned lock only means a previous select panicked mid-swap
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.replace(token)
    }
}
