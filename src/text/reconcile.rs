//! Hypothesis reconciliation across overlapping recognition windows.
//!
//! Each recognition window re-reads audio the previous window already
//! covered, so successive window texts are noisy, partially-correct variants
//! of the same sentence. `reconcile` folds a fresh window text into the
//! running hypothesis, producing a single growing sentence, and reports when
//! divergent text means the previous sentence is finished.

use crate::defaults;
use crate::text::boundary::BoundaryRules;
use crate::text::normalize::word_count;
use crate::text::similarity::{longest_common_block, similarity};

/// Minimum hypothesis word count before divergent text may finalize it.
const MIN_FINALIZE_WORDS: usize = 5;

/// Outcome of folding one window text into the hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The hypothesis after the merge.
    pub updated: String,
    /// A sentence completed by this window, to be dispatched.
    ///
    /// Only produced when the incoming text diverges from a hypothesis that
    /// already reads as a full sentence.
    pub finalized: Option<String>,
}

impl Reconciliation {
    fn keep(text: &str) -> Self {
        Self {
            updated: text.to_string(),
            finalized: None,
        }
    }
}

/// Folds `incoming` (a cleaned window transcription) into `current`.
pub fn reconcile(current: &str, incoming: &str, rules: &BoundaryRules) -> Reconciliation {
    // 1. Nothing yet: adopt the window text.
    if current.is_empty() {
        return Reconciliation::keep(incoming);
    }

    // 2. Consistent forward extension: the recognizer heard more of the
    //    same sentence.
    if incoming.starts_with(current) {
        return Reconciliation::keep(incoming);
    }

    // 3. Stale subset: the window re-heard a prefix we already have.
    if current.starts_with(incoming) {
        return Reconciliation::keep(current);
    }

    let sim = similarity(current, incoming);
    if sim > defaults::MERGE_SIMILARITY {
        return Reconciliation {
            updated: stitch(current, incoming),
            finalized: None,
        };
    }

    // 5. Divergent text: sentence-boundary candidate.
    if word_count(current) >= MIN_FINALIZE_WORDS {
        if rules.is_sentence_end(current) {
            return Reconciliation {
                updated: incoming.to_string(),
                finalized: Some(current.to_string()),
            };
        }
        // Incomplete sentence: assume the recognizer restarted mid-utterance.
        return Reconciliation::keep(&format!("{} {}", current, incoming));
    }

    // Hypothesis too short to matter.
    Reconciliation::keep(incoming)
}

/// Merges two similar texts around their largest shared run.
///
/// With a long enough anchor, takes the longer of the two prefixes, the
/// anchor itself, and the incoming text's suffix. Without one, keeps the
/// longer text whole.
fn stitch(current: &str, incoming: &str) -> String {
    let block = longest_common_block(current, incoming);
    if block.len <= defaults::MERGE_MIN_COMMON {
        return longer_of(current, incoming).to_string();
    }

    let cur: Vec<char> = current.chars().collect();
    let inc: Vec<char> = incoming.chars().collect();

    let cur_prefix = &cur[..block.a_start];
    let inc_prefix = &inc[..block.b_start];
    let prefix = if cur_prefix.len() > inc_prefix.len() {
        cur_prefix
    } else {
        inc_prefix
    };
    let common = &cur[block.a_start..block.a_start + block.len];
    let suffix = &inc[block.b_start + block.len..];

    prefix
        .iter()
        .chain(common.iter())
        .chain(suffix.iter())
        .collect()
}

fn longer_of<'a>(a: &'a str, b: &'a str) -> &'a str {
    if a.chars().count() > b.chars().count() {
        a
    } else {
        b
    }
}
