//! Sentence-boundary classification.
//!
//! Decides whether an in-progress hypothesis reads as a complete sentence:
//! - terminal punctuation with enough words behind it,
//! - a trailing comma/colon on a long clause,
//! - or sheer length, as long as the text doesn't end on a conjunction.
//!
//! Conjunction lists are per-language. English and Korean are built in;
//! other languages fall back to the English set until a list is provided.

use crate::defaults;
use crate::text::normalize::word_count;

const ENGLISH_CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "because", "while", "if", "unless", "although", "since", "when", "as",
];

const KOREAN_CONJUNCTIONS: &[&str] = &[
    "그리고",
    "또한",
    "하지만",
    "그러나",
    "또는",
    "혹은",
    "왜냐하면",
    "때문에",
    "만약",
    "비록",
];

/// Per-language sentence-end rules.
#[derive(Debug, Clone)]
pub struct BoundaryRules {
    conjunctions: Vec<String>,
}

impl BoundaryRules {
    /// Returns the rules for a translation-style language tag.
    pub fn for_language(tag: &str) -> Self {
        let list = match tag {
            "kor_Hang" => KOREAN_CONJUNCTIONS,
            _ => ENGLISH_CONJUNCTIONS,
        };
        Self {
            conjunctions: list.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds rules with a custom conjunction list.
    pub fn with_conjunctions<I, S>(conjunctions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            conjunctions: conjunctions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `text` reads as a complete sentence.
    pub fn is_sentence_end(&self, text: &str) -> bool {
        let text = text.trim_end();
        if text.is_empty() {
            return false;
        }

        let words = word_count(text);

        if ends_with_punctuation(text, &['.', '!', '?']) {
            // Short fragments ending in punctuation are not trusted.
            return words >= defaults::BOUNDARY_MIN_WORDS;
        }

        if ends_with_punctuation(text, &[',', ':']) && words > defaults::BOUNDARY_COMMA_WORDS {
            return true;
        }

        if words > defaults::BOUNDARY_LONG_WORDS {
            let last = text
                .split_whitespace()
                .next_back()
                .unwrap_or("")
                .to_lowercase();
            return !self.conjunctions.iter().any(|c| *c == last);
        }

        false
    }
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self::for_language(defaults::DEFAULT_SOURCE_LANGUAGE)
    }
}

/// True if the last non-quote, non-space character is one of `marks`.
fn ends_with_punctuation(text: &str, marks: &[char]) -> bool {
    text.chars()
        .rev()
        .find(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
        .is_some_and(|c| marks.contains(&c))
}
