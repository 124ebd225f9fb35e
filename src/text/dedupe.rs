//! Emission deduplication.
//!
//! Overlapping windows re-recognize the same speech, so the same sentence
//! can reach the dispatch path more than once. Each session keeps one
//! history per emission kind (transcripts, translations); a candidate is
//! rejected when it already appears verbatim anywhere in the history, or
//! when it is near-identical to a recent entry.

use crate::defaults;
use crate::text::similarity::similarity;

/// Append-only emission history with a duplicate gate.
#[derive(Debug, Clone, Default)]
pub struct EmissionHistory {
    entries: Vec<String>,
}

impl EmissionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `text` should be suppressed.
    ///
    /// Exact matches are checked against the whole history; the similarity
    /// check only consults the most recent entries to bound its cost.
    pub fn is_duplicate(&self, text: &str) -> bool {
        if self.entries.iter().any(|e| e == text) {
            return true;
        }

        let recent_start = self.entries.len().saturating_sub(defaults::DEDUPE_RECENT);
        self.entries[recent_start..]
            .iter()
            .any(|e| similarity(text, e) > defaults::DUPLICATE_SIMILARITY)
    }

    /// Records an emitted text.
    pub fn push(&mut self, text: String) {
        self.entries.push(text);
    }

    /// Number of recorded emissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears the history (session reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
