//! Chord notation
//!
//! Chord sheets use an inline bracket notation: a chord token precedes the
//! syllable it annotates, e.g. `[C]I've been [Am]down`. Text of this shape
//! arrives from manual sheet entries, both tab-site extractors and the
//! generative fallback.
//!
//! - [`parser`] classifies single lines into [`ChordLine`] records. It knows
//!   nothing about layout.
//! - [`renderer`] turns a sequence of records into display lines. All layout
//!   decisions live there.

pub mod parser;
pub mod renderer;

pub use parser::{parse_line, parse_sheet, ChordLine, ChordToken};
pub use renderer::{ChordSheetRenderer, InlineSegment, LayoutMode, RenderableLine};
