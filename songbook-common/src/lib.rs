//! # Songbook Common Library
//!
//! Shared code for the songbook service:
//! - Song model and spreadsheet feed mapping
//! - Chord notation parser and renderer
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod notation;
pub mod sheet;
pub mod song;

pub use error::{Error, Result};
pub use notation::{ChordLine, ChordSheetRenderer, ChordToken, LayoutMode, RenderableLine};
pub use song::Song;
