//! Hypothesis stability bookkeeping.
//!
//! Tracks how settled the stream of raw window transcriptions looks:
//! identical repeats, steady bounded growth, or high similarity all build
//! confidence; a jump resets it. Advisory only — no flush decision consults
//! the verdict; it is surfaced for diagnostics and kept available for
//! future gating.

use crate::defaults;
use crate::text::similarity::similarity;

/// Rolling stability state for a session's hypothesis.
#[derive(Debug, Clone, Default)]
pub struct StabilityTracker {
    /// Last raw window-level transcription seen.
    pending_text: String,
    /// Consecutive consistent observations.
    counter: u32,
    /// Most recent text that was judged stable.
    last_stable_text: String,
}

impl StabilityTracker {
    /// Creates a fresh tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw window transcription; returns true when the text has
    /// settled.
    pub fn track(&mut self, new_text: &str) -> bool {
        // Identical repeat.
        if self.pending_text == new_text {
            self.counter += 1;
            if self.counter >= defaults::STABLE_REPEAT_COUNT {
                self.last_stable_text = new_text.to_string();
                return true;
            }
            return false;
        }

        // Consistent bounded forward growth.
        if new_text.starts_with(&self.pending_text) {
            let added = new_text.chars().count() - self.pending_text.chars().count();
            if added > defaults::STABLE_GROWTH_MAX_CHARS {
                self.counter = 0;
                self.pending_text = new_text.to_string();
                return false;
            }
            self.counter += 1;
            self.pending_text = new_text.to_string();
            if self.counter >= defaults::STABLE_GROWTH_COUNT {
                self.last_stable_text = new_text.to_string();
                return true;
            }
            return false;
        }

        // Near-identical revision.
        if similarity(&self.pending_text, new_text) > defaults::STABLE_SIMILARITY {
            self.counter += 1;
            self.pending_text = new_text.to_string();
            if self.counter >= defaults::STABLE_GROWTH_COUNT {
                self.last_stable_text = new_text.to_string();
                return true;
            }
            return false;
        }

        // Divergence: start over.
        self.counter = 0;
        self.pending_text = new_text.to_string();
        false
    }

    /// Last raw transcription observed.
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Consecutive consistent observations so far.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Most recent text judged stable, if any.
    pub fn last_stable_text(&self) -> &str {
        &self.last_stable_text
    }

    /// Resets the counter (after a flush).
    pub fn reset_counter(&mut self) {
        self.counter = 0;
    }

    /// Full reset (session restart).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
