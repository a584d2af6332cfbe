//! Parser/renderer properties over a realistic chord sheet

use once_cell::sync::Lazy;
use regex::Regex;
use songbook_common::notation::{parse_line, parse_sheet};
use songbook_common::{ChordLine, ChordSheetRenderer, LayoutMode, RenderableLine};

static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

const SHEET: &str = "[Intro]
e|-----0-----3---|
B|---1---1-------|
  --2----2--5--

[Verse1]
[C] I've been [Am] down, [F]so [G]down
Hal[F]le[G]lu[Am]jah
Just words with no chords

[Chorus]
[G][D/F#]Oh,   the [Em7]wonder[Cadd9]wall
An unfinished [bracket";

#[test]
fn test_tablature_renders_character_for_character() {
    for mode in [LayoutMode::Inline, LayoutMode::Stacked] {
        let renderer = ChordSheetRenderer::new(mode);
        for raw in SHEET.lines() {
            let parsed = parse_line(raw);
            if let ChordLine::Tablature { .. } = parsed {
                assert_eq!(
                    renderer.render_line(&parsed),
                    RenderableLine::Monospace {
                        text: raw.to_string()
                    }
                );
            }
        }
    }
}

#[test]
fn test_stripped_lyric_equals_raw_without_brackets() {
    let mut annotated = 0;
    for raw in SHEET.lines() {
        if let ChordLine::AnnotatedLyric { lyric, .. } = parse_line(raw) {
            annotated += 1;
            assert_eq!(lyric, BRACKETS.replace_all(raw, ""), "line {raw:?}");
        }
    }
    assert!(annotated >= 4);
}

#[test]
fn test_offsets_are_monotonic_and_in_bounds() {
    for line in parse_sheet(SHEET) {
        if let ChordLine::AnnotatedLyric { lyric, tokens } = line {
            let len = lyric.chars().count();
            let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
            assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{offsets:?}");
            assert!(offsets.iter().all(|&o| o <= len), "{offsets:?} > {len}");
        }
    }
}

#[test]
fn test_sheet_classification_sequence() {
    let kinds: Vec<&str> = parse_sheet(SHEET)
        .iter()
        .map(|line| match line {
            ChordLine::SectionHeader { .. } => "header",
            ChordLine::Tablature { .. } => "tab",
            ChordLine::PlainLyric { .. } => "plain",
            ChordLine::Blank => "blank",
            ChordLine::AnnotatedLyric { .. } => "chords",
        })
        .collect();

    assert_eq!(
        kinds,
        [
            "header", "tab", "tab", "tab", "blank", "header", "chords", "chords", "plain",
            "blank", "chords", "chords", "plain",
        ]
    );
}

#[test]
fn test_render_is_deterministic_and_order_preserving() {
    let lines = parse_sheet(SHEET);
    let renderer = ChordSheetRenderer::new(LayoutMode::Stacked);

    let first = renderer.render(&lines);
    let second = renderer.render(&lines);

    assert_eq!(first, second);
    assert_eq!(first.len(), lines.len());
    assert!(matches!(first[0], RenderableLine::Heading { .. }));
}

#[test]
fn test_inline_text_round_trips_annotated_lines() {
    let renderer = ChordSheetRenderer::new(LayoutMode::Inline);
    let raw = "Hal[F]le[G]lu[Am]jah";
    assert_eq!(renderer.render_line(&parse_line(raw)).to_plain_text(), raw);
}

#[test]
fn test_wire_shape_is_tagged_by_kind() {
    let parsed = parse_line("Hal[F]le");
    assert_eq!(
        serde_json::to_value(&parsed).unwrap(),
        serde_json::json!({
            "kind": "annotated_lyric",
            "lyric": "Halle",
            "tokens": [{"chord": "F", "offset": 3}]
        })
    );

    let stacked = ChordSheetRenderer::new(LayoutMode::Stacked).render_line(&parsed);
    assert_eq!(
        serde_json::to_value(&stacked).unwrap(),
        serde_json::json!({"kind": "stacked", "chords": "   F", "lyric": "Halle"})
    );
    assert_eq!(serde_json::to_value(RenderableLine::Spacer).unwrap(), serde_json::json!({"kind": "spacer"}));
}
