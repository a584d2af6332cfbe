//! Display layout for parsed chord sheets
//!
//! Chord-annotated lyrics can be laid out two ways, selected by [`LayoutMode`]:
//!
//! - **Inline**: chord symbols are inserted immediately before the lyric
//!   character they annotate (rendered superscript-like by the client).
//! - **Stacked**: a chord row padded with spaces sits directly above the lyric
//!   row. Columns only line up in a monospaced font.
//!
//! Every other line kind renders the same in both modes.

use super::parser::{ChordLine, ChordToken};
use serde::{Deserialize, Serialize};

/// Layout strategy for chord-annotated lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Chords inserted before their lyric position
    #[default]
    Inline,
    /// Chord row above lyric row
    Stacked,
}

impl std::str::FromStr for LayoutMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(LayoutMode::Inline),
            "stacked" => Ok(LayoutMode::Stacked),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown layout mode '{}' (expected inline or stacked)",
                other
            ))),
        }
    }
}

/// Lyric text preceded by an optional chord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSegment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord: Option<String>,
    pub text: String,
}

/// One display line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderableLine {
    /// Emphasized section label
    Heading { label: String },
    /// Verbatim monospaced block
    Monospace { text: String },
    /// Ordinary text line
    Text { text: String },
    /// Fixed vertical spacing
    Spacer,
    /// Inline layout of an annotated line
    Inline { segments: Vec<InlineSegment> },
    /// Stacked layout of an annotated line
    Stacked { chords: String, lyric: String },
}

impl RenderableLine {
    /// Monospace text rendering of the line
    ///
    /// Inline lines keep chords in brackets; stacked lines produce two rows.
    pub fn to_plain_text(&self) -> String {
        match self {
            RenderableLine::Heading { label } => format!("[{}]", label),
            RenderableLine::Monospace { text } | RenderableLine::Text { text } => text.clone(),
            RenderableLine::Spacer => String::new(),
            RenderableLine::Inline { segments } => segments
                .iter()
                .map(|s| match &s.chord {
                    Some(chord) => format!("[{}]{}", chord, s.text),
                    None => s.text.clone(),
                })
                .collect(),
            RenderableLine::Stacked { chords, lyric } => format!("{}\n{}", chords, lyric),
        }
    }
}

/// Renders parsed lines using one layout mode
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordSheetRenderer {
    mode: LayoutMode,
}

impl ChordSheetRenderer {
    pub fn new(mode: LayoutMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Render a sequence of parsed lines, preserving order
    pub fn render(&self, lines: &[ChordLine]) -> Vec<RenderableLine> {
        lines.iter().map(|line| self.render_line(line)).collect()
    }

    /// Render a whole sheet to monospace text
    pub fn render_text(&self, lines: &[ChordLine]) -> String {
        self.render(lines)
            .iter()
            .map(RenderableLine::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_line(&self, line: &ChordLine) -> RenderableLine {
        match line {
            ChordLine::SectionHeader { label } => RenderableLine::Heading {
                label: label.clone(),
            },
            ChordLine::Tablature { raw } => RenderableLine::Monospace { text: raw.clone() },
            ChordLine::PlainLyric { text } => RenderableLine::Text { text: text.clone() },
            ChordLine::Blank => RenderableLine::Spacer,
            ChordLine::AnnotatedLyric { lyric, tokens } => match self.mode {
                LayoutMode::Inline => RenderableLine::Inline {
                    segments: inline_segments(lyric, tokens),
                },
                LayoutMode::Stacked => RenderableLine::Stacked {
                    chords: chord_row(tokens),
                    lyric: lyric.clone(),
                },
            },
        }
    }
}

/// Split the lyric at every token offset
fn inline_segments(lyric: &str, tokens: &[ChordToken]) -> Vec<InlineSegment> {
    let mut segments = Vec::with_capacity(tokens.len() + 1);

    let lead_end = tokens.first().map_or(lyric.chars().count(), |t| t.offset);
    let lead = char_slice(lyric, 0, lead_end);
    if !lead.is_empty() {
        segments.push(InlineSegment {
            chord: None,
            text: lead.to_string(),
        });
    }

    for (i, token) in tokens.iter().enumerate() {
        let end = tokens
            .get(i + 1)
            .map_or(usize::MAX, |next| next.offset);
        segments.push(InlineSegment {
            chord: Some(token.chord.clone()),
            text: char_slice(lyric, token.offset, end).to_string(),
        });
    }

    segments
}

/// Chord row for stacked layout
///
/// Each chord starts at its offset column; a chord that would overlap its
/// predecessor is pushed one column past it.
fn chord_row(tokens: &[ChordToken]) -> String {
    let mut row = String::new();
    let mut width = 0;

    for token in tokens {
        let column = if width == 0 {
            token.offset
        } else {
            token.offset.max(width + 1)
        };
        row.extend(std::iter::repeat(' ').take(column - width));
        row.push_str(&token.chord);
        width = column + token.chord.chars().count();
    }

    row
}

/// Substring by character positions, clamped to the string
fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        s.char_indices()
            .nth(pos)
            .map_or(s.len(), |(index, _)| index)
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end).max(start_byte);
    &s[start_byte..end_byte]
}
