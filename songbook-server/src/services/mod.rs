//! Service modules
//!
//! - chord and insight resolution for a song
//! - the current-selection holder that runs both concurrently
//! - the spreadsheet-backed song catalog

pub mod chord_resolver;
pub mod insight_resolver;
pub mod selection;
pub mod song_catalog;

pub use chord_resolver::{ChordSourceResolver, CHORDS_UNAVAILABLE};
pub use insight_resolver::{InsightResolver, INSIGHT_NOT_CONFIGURED, INSIGHT_UNAVAILABLE};
pub use selection::{SelectionSnapshot, Slot, SongSelection};
pub use song_catalog::{CatalogError, SongCatalog};
