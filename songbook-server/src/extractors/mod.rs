//! Chord sources
//!
//! Each source implements [`ChordSource`] and produces bracket-notation text.
//!
//! # Sources (chain order)
//! 1. **songsterr** - search by artist/title, scrape the chords page
//! 2. **ultimate_guitar** - scrape a known tab URL (only for UG URLs)
//! 3. **generated** - generative fallback
//!
//! Page-parsing heuristics live in [`locator`] so site adapters can share
//! and swap them.

pub mod generated;
pub mod locator;
pub mod songsterr;
pub mod ultimate_guitar;

pub use generated::GeneratedChordSource;
pub use songsterr::SongsterrClient;
pub use ultimate_guitar::UltimateGuitarClient;

// ============================================================================
// Mock Source for Testing
// ============================================================================
