//! Transcription text cleanup.

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops consecutive case-insensitive duplicate words (recognizer stutter).
///
/// Texts of 3 words or fewer pass through untouched: short phrases repeat
/// words legitimately more often than the recognizer stutters on them.
pub fn collapse_stutter(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 3 {
        return text.to_string();
    }

    let mut result: Vec<&str> = Vec::with_capacity(words.len());
    for word in words {
        if result
            .last()
            .is_some_and(|prev| prev.eq_ignore_ascii_case(word))
        {
            continue;
        }
        result.push(word);
    }
    result.join(" ")
}

/// Word count by whitespace splitting, the unit every length policy uses.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
