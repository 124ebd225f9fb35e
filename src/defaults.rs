//! Default configuration constants for livecap.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16_000;

/// Recognition window size in samples (~5 seconds at 16kHz).
///
/// A window is dispatched to recognition once the session buffer holds at
/// least this many samples.
pub const WINDOW_SAMPLES: usize = SAMPLE_RATE as usize * 5;

/// Minimum buffered samples before a window is worth recognizing (~2s).
///
/// Buffers below this are accumulated but not processed.
pub const MIN_WINDOW_SAMPLES: usize = SAMPLE_RATE as usize * 2;

/// Minimum buffered samples for the final recognition pass on stop.
pub const STOP_FLUSH_MIN_SAMPLES: usize = 4_000;

/// Numerator/denominator of the window fraction consumed per recognition.
///
/// Consuming 2/3 of the window keeps the trailing third in the buffer, so
/// consecutive windows share lexical content and hypothesis reconciliation
/// has an anchor to merge on.
pub const WINDOW_CONSUME_NUMER: usize = 2;
pub const WINDOW_CONSUME_DENOM: usize = 3;

/// Maximum buffer age before a content-free session's buffer is dropped.
pub const MAX_BUFFER_AGE: Duration = Duration::from_secs(10);

/// Minimum interval between recognition dispatches for one session.
pub const MIN_PROCESS_INTERVAL: Duration = Duration::from_secs(2);

/// Capacity of the per-session rolling energy history.
pub const ENERGY_HISTORY_LEN: usize = 10;

/// Absolute floor for the adaptive energy threshold.
pub const ENERGY_FLOOR: f32 = 0.005;

/// Fraction of the rolling mean energy used as the speech threshold.
///
/// Riding at 80% of recent loudness keeps the threshold tracking ambient
/// noise instead of sitting at a fixed level.
pub const ADAPTIVE_ENERGY_RATIO: f32 = 0.8;

/// Assumed mean energy before any window has been observed.
pub const FALLBACK_MEAN_ENERGY: f32 = 0.008;

/// Windows quieter than this fraction of the threshold skip recognition.
pub const QUIET_SKIP_RATIO: f32 = 0.5;

/// Silence duration after which in-progress speech is considered ended.
pub const MIN_SILENCE_FOR_PROCESSING: Duration = Duration::from_millis(2_500);

/// Watchdog poll period.
pub const WATCHDOG_PERIOD: Duration = Duration::from_secs(2);

/// Silence since last voice activity before the watchdog may flush.
pub const WATCHDOG_MIN_SILENCE: Duration = Duration::from_secs(4);

/// How long the hypothesis must sit unchanged before the watchdog flushes it.
pub const WATCHDOG_STALE_AFTER: Duration = Duration::from_secs(5);

/// Minimum hypothesis word count for a watchdog flush.
pub const WATCHDOG_MIN_WORDS: usize = 2;

/// Minimum interval between client-forced flushes.
pub const FORCE_PROCESS_INTERVAL: Duration = Duration::from_millis(800);

/// Minimum hypothesis length (chars) for a forced flush to dispatch.
pub const FORCE_MIN_CHARS: usize = 5;

/// Minimum interval between partial_transcription emissions.
pub const PARTIAL_UPDATE_THROTTLE: Duration = Duration::from_millis(200);

/// Texts below this word count are never dispatched for translation.
pub const MIN_DISPATCH_WORDS: usize = 3;

/// Minimum recognized word count before language auto-detection fires.
pub const MIN_DETECT_WORDS: usize = 3;

/// Minimum detector confidence for a language guess to be accepted.
///
/// Deliberately permissive: a guess is preferred over none.
pub const DETECT_MIN_CONFIDENCE: f32 = 0.3;

/// Similarity above which two hypotheses are considered merge candidates.
pub const MERGE_SIMILARITY: f32 = 0.5;

/// Minimum common-block length (chars) to anchor a stitched merge.
pub const MERGE_MIN_COMMON: usize = 8;

/// Similarity above which two emissions are considered duplicates.
pub const DUPLICATE_SIMILARITY: f32 = 0.95;

/// How many recent history entries participate in near-duplicate checks.
pub const DEDUPE_RECENT: usize = 5;

/// Minimum word count for terminal punctuation to mark a sentence end.
pub const BOUNDARY_MIN_WORDS: usize = 5;

/// Word count above which a trailing comma/colon marks a sentence end.
pub const BOUNDARY_COMMA_WORDS: usize = 12;

/// Word count above which a sentence ends regardless of punctuation,
/// unless the last word is a conjunction.
pub const BOUNDARY_LONG_WORDS: usize = 20;

/// Recognition segments below this average log-probability are discarded.
pub const SEGMENT_MIN_LOGPROB: f32 = -1.0;

/// Recognition segments with trimmed text shorter than this are discarded.
pub const SEGMENT_MIN_CHARS: usize = 2;

/// Identical repeats required for the stability tracker to report stable.
pub const STABLE_REPEAT_COUNT: u32 = 3;

/// Consistent growth/similarity observations required for stability.
pub const STABLE_GROWTH_COUNT: u32 = 2;

/// Maximum characters added per observation for growth to count as stable.
pub const STABLE_GROWTH_MAX_CHARS: usize = 40;

/// Similarity above which an observation counts toward stability.
pub const STABLE_SIMILARITY: f32 = 0.7;

/// Default source language tag (NLLB-style).
pub const DEFAULT_SOURCE_LANGUAGE: &str = "eng_Latn";

/// Default target language tag (NLLB-style).
pub const DEFAULT_TARGET_LANGUAGE: &str = "kor_Hang";

/// Source-language value that enables automatic detection.
pub const AUTO_LANGUAGE: &str = "auto";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_retains_trailing_third() {
        let consumed = WINDOW_SAMPLES * WINDOW_CONSUME_NUMER / WINDOW_CONSUME_DENOM;
        let retained = WINDOW_SAMPLES - consumed;
        // 5s window at 16kHz: 80_000 samples, 53_333 consumed, 26_667 kept.
        assert_eq!(consumed, 53_333);
        assert_eq!(retained, 26_667);
    }

    #[test]
    fn min_window_is_two_seconds() {
        assert_eq!(MIN_WINDOW_SAMPLES, 32_000);
    }

    #[test]
    fn energy_floor_below_fallback_threshold() {
        // The fallback mean keeps the first threshold above the floor.
        assert!(FALLBACK_MEAN_ENERGY * ADAPTIVE_ENERGY_RATIO > ENERGY_FLOOR);
    }
}
