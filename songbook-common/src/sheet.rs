//! Spreadsheet feed mapping
//!
//! The song list is published as a CSV export of a Google Sheet. Column layout:
//!
//! | index | column            |
//! |-------|-------------------|
//! | 0     | band              |
//! | 1     | title             |
//! | 2     | YouTube link      |
//! | 3     | tab URL or text   |
//! | 4     | embed link        |
//! | 5     | manual chords     |
//! | 6     | manual chords (backup) |

use crate::song::Song;

/// Minimum row width; short rows are padded so every column index is valid
pub const SHEET_COLUMNS: usize = 7;

/// Band name used when the band cell is empty
pub const UNKNOWN_BAND: &str = "Nieznany Zespół";

const COL_BAND: usize = 0;
const COL_TITLE: usize = 1;
const COL_YOUTUBE: usize = 2;
const COL_CONTENT: usize = 3;
const COL_EMBED: usize = 4;
const COL_MANUAL: usize = 5;
const COL_MANUAL_BACKUP: usize = 6;

/// Parse CSV text into rows of fields
///
/// Quoted fields may contain separators and line breaks; `""` inside quotes is
/// an escaped quote. Records end at `\n`, `\r\n` or `\r`. Empty lines are
/// skipped and every row is padded to [`SHEET_COLUMNS`] fields.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\n' | '\r' => {
                if !field.is_empty() || !row.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    for row in &mut rows {
        if row.len() < SHEET_COLUMNS {
            row.resize(SHEET_COLUMNS, String::new());
        }
    }

    rows
}

/// Map sheet rows (header included) to songs
///
/// Rows without a title are dropped. The row index used for ids counts data
/// rows only, before filtering, so ids stay stable when a title is blanked.
pub fn songs_from_rows(rows: &[Vec<String>]) -> Vec<Song> {
    rows.iter()
        .skip(1)
        .enumerate()
        .filter_map(|(index, row)| song_from_row(index, row))
        .collect()
}

/// Parse CSV text straight into songs
pub fn songs_from_csv(text: &str) -> Vec<Song> {
    songs_from_rows(&parse_csv(text))
}

fn song_from_row(index: usize, row: &[String]) -> Option<Song> {
    let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

    let title = cell(COL_TITLE);
    if title.is_empty() {
        return None;
    }

    let band = match cell(COL_BAND) {
        "" => UNKNOWN_BAND,
        band => band,
    };

    // The backup column catches sheets where the chords landed one column right
    let manual = match cell(COL_MANUAL) {
        "" => cell(COL_MANUAL_BACKUP),
        text => text,
    }
    .trim();

    Some(Song {
        id: format!("{}-{}", index, title),
        band: band.to_string(),
        title: title.to_string(),
        content: cell(COL_CONTENT).to_string(),
        youtube_url: cell(COL_YOUTUBE).to_string(),
        embed_url: cell(COL_EMBED).to_string(),
        manual_chords: (!manual.is_empty()).then(|| manual.to_string()),
        raw_index: index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_quotes_and_line_endings() {
        let rows = parse_csv("a,\"b,c\",\"say \"\"hi\"\"\"\r\nd,\"multi\nline\"\n\n");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][..3], ["a", "b,c", "say \"hi\""]);
        assert_eq!(rows[1][..2], ["d", "multi\nline"]);
    }

    #[test]
    fn test_parse_csv_pads_short_rows() {
        let rows = parse_csv("only,two");
        assert_eq!(rows[0].len(), SHEET_COLUMNS);
        assert_eq!(rows[0][6], "");
    }

    #[test]
    fn test_parse_csv_trailing_record_without_newline() {
        let rows = parse_csv("h1,h2\nx,y");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "x");
    }

    #[test]
    fn test_songs_from_rows_mapping() {
        let csv = "Zespół,Tytuł,YT,Taby,Embed,Tekst,Backup\n\
                   Oasis,Wonderwall,https://youtu.be/x,https://tabs.ultimate-guitar.com/tab/1,,,\n\
                   ,Untitled Band,,[C]la,,,\n\
                   Nobody,,,,,,\n\
                   Queen,Bohemian,,,,  ,[Bb]Mama\n";

        let songs = songs_from_csv(csv);

        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0].id, "0-Wonderwall");
        assert_eq!(songs[0].content, "https://tabs.ultimate-guitar.com/tab/1");
        assert_eq!(songs[0].manual_chords, None);

        assert_eq!(songs[1].band, UNKNOWN_BAND);
        assert_eq!(songs[1].content, "[C]la");

        // Row 2 had no title and is dropped, but indices keep counting
        assert_eq!(songs[2].id, "3-Bohemian");
        assert_eq!(songs[2].raw_index, 3);
    }

    #[test]
    fn test_manual_column_prefers_f_over_backup() {
        let csv = "h\nA,T,,,,[G]main,[D]backup\nB,U,,,,,[D]backup\n";
        let songs = songs_from_csv(csv);

        assert_eq!(songs[0].manual_chords.as_deref(), Some("[G]main"));
        assert_eq!(songs[1].manual_chords.as_deref(), Some("[D]backup"));
    }
}
