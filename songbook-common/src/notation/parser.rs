//! Line classification for bracket chord notation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Whole line wrapped in one bracket pair, e.g. `[Verse1]`
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.*?)\]$").expect("header regex is valid"));

/// Any of: `|---|`, a string marker `e|` / `B|`, or dashes around fret numbers
static TAB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|-+\||e\||B\||-+\d+-+").expect("tablature regex is valid"));

/// One bracket token; an unterminated `[` never matches
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("chord token regex is valid"));

/// Headers shorter than this are too ambiguous to tell apart from chords
const MIN_HEADER_LEN: usize = 6;

/// A chord positioned against the stripped lyric text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordToken {
    /// Chord symbol exactly as written between the brackets
    pub chord: String,
    /// Character offset into the stripped lyric where the chord applies
    pub offset: usize,
}

/// One classified line of a chord sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChordLine {
    /// Section label such as `Intro` or `Verse1`
    SectionHeader { label: String },
    /// Tablature, whitespace-significant
    Tablature { raw: String },
    /// Lyric text without chords
    PlainLyric { text: String },
    /// Whitespace-only line
    Blank,
    /// Lyric with chords; `lyric` has all bracket tokens removed
    AnnotatedLyric {
        lyric: String,
        tokens: Vec<ChordToken>,
    },
}

impl ChordLine {
    /// Chord tokens of an annotated line, empty otherwise
    pub fn tokens(&self) -> &[ChordToken] {
        match self {
            ChordLine::AnnotatedLyric { tokens, .. } => tokens,
            _ => &[],
        }
    }
}

/// Classify one line of raw chord-sheet text
///
/// First match wins: section header, tablature, plain lyric, annotated lyric.
pub fn parse_line(raw: &str) -> ChordLine {
    if let Some(label) = section_label(raw) {
        return ChordLine::SectionHeader {
            label: label.to_string(),
        };
    }

    if TAB_RE.is_match(raw) {
        return ChordLine::Tablature {
            raw: raw.to_string(),
        };
    }

    if !TOKEN_RE.is_match(raw) {
        if raw.trim().is_empty() {
            return ChordLine::Blank;
        }
        return ChordLine::PlainLyric {
            text: raw.to_string(),
        };
    }

    parse_annotated(raw)
}

/// Split text into lines and classify each one
///
/// A trailing `\r` is dropped so CRLF sources parse like LF sources.
pub fn parse_sheet(text: &str) -> Vec<ChordLine> {
    text.split('\n')
        .map(|line| parse_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

fn section_label(raw: &str) -> Option<&str> {
    if raw.contains(' ') || raw.chars().count() < MIN_HEADER_LEN {
        return None;
    }

    let inner = HEADER_RE.captures(raw.trim())?.get(1)?.as_str();

    // `[Am]`-like content is a chord, not a label
    match inner.chars().next() {
        Some('A'..='G') => None,
        _ => Some(inner),
    }
}

fn parse_annotated(raw: &str) -> ChordLine {
    let mut lyric = String::with_capacity(raw.len());
    let mut lyric_chars = 0;
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for token in TOKEN_RE.find_iter(raw) {
        let text = &raw[last_end..token.start()];
        lyric.push_str(text);
        lyric_chars += text.chars().count();

        let bracketed = token.as_str();
        tokens.push(ChordToken {
            chord: bracketed[1..bracketed.len() - 1].to_string(),
            offset: lyric_chars,
        });
        last_end = token.end();
    }
    lyric.push_str(&raw[last_end..]);

    ChordLine::AnnotatedLyric { lyric, tokens }
}
