//! Prompt builders
//!
//! Prompts are written in Polish; the songbook's audience is Polish-speaking.

/// Characters of song content handed to the insight prompt
pub const INSIGHT_CONTEXT_CHARS: usize = 500;

/// First `max_chars` characters of `text`
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Three short playing tips, one per line, no bullets
pub fn insight_prompt(band: &str, title: &str, context: &str) -> String {
    format!(
        "Jesteś ekspertem muzycznym. Podaj 3 bardzo krótkie, praktyczne wskazówki dotyczące grania \
         piosenki \"{title}\" wykonawcy \"{band}\".\n\
         Skup się na rytmie, biciu lub trudności akordów.\n\
         ZASADY:\n\
         1. Używaj JĘZYKA POLSKIEGO.\n\
         2. Każda wskazówka MUSI być w nowej linii.\n\
         3. Nie używaj gwiazdek, kropek ani punktorów na początku linii.\n\
         4. Maksimum 15 słów na wskazówkę.\n\n\
         Tekst/Akordy pomocniczo: {}",
        excerpt(context, INSIGHT_CONTEXT_CHARS)
    )
}

/// Lyrics with bracket chords placed right before the annotated syllable
pub fn chords_prompt(band: &str, title: &str, source_url: &str) -> String {
    format!(
        "Jesteś profesjonalnym transkrybentem muzycznym. Podaj tekst piosenki \"{title}\" \
         wykonawcy \"{band}\" wraz z akordami.\n\
         Użyj linku jako źródła, jeśli to możliwe: {source_url}\n\n\
         ZASADY FORMATOWANIA:\n\
         1. Umieszczaj akordy w nawiasach kwadratowych BEZPOŚREDNIO PRZED słowem lub sylabą, \
         nad którą powinny się znajdować, np. [C]I've been [Am]down.\n\
         2. Podaj tylko najważniejsze części: zwrotki i refreny.\n\
         3. Zachowaj oryginalny język piosenki.\n\
         4. Bez wstępów i podziękowań, tylko czysty tekst z akordami w nawiasach."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("żółw", 2), "żó");
        assert_eq!(excerpt("abc", 10), "abc");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn test_insight_prompt_bounds_context() {
        let context = "x".repeat(2000);
        let prompt = insight_prompt("Band", "Song", &context);

        assert!(prompt.contains("\"Song\""));
        assert!(prompt.contains("\"Band\""));
        assert!(prompt.ends_with(&"x".repeat(INSIGHT_CONTEXT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(INSIGHT_CONTEXT_CHARS + 1)));
    }

    #[test]
    fn test_chords_prompt_mentions_source() {
        let prompt = chords_prompt("Band", "Song", "https://tabs.example.com/1");
        assert!(prompt.contains("https://tabs.example.com/1"));
        assert!(prompt.contains("[C]I've been [Am]down"));
    }
}
