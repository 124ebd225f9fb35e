//! livecap - Streaming live-caption and translation session engine
//!
//! Audio arrives in small chunks over a persistent per-client connection,
//! gets windowed and voice-activity-gated, recognized by an external speech
//! engine, reconciled across overlapping windows into a single growing
//! sentence, split at sentence boundaries, deduplicated, and translated —
//! per session, continuously.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod asr;
pub mod audio;
pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod lang;
pub mod langid;
pub mod pipeline;
pub mod protocol;
pub mod session;
pub mod text;
pub mod translate;

// Core engine
pub use pipeline::{CaptionPipeline, PipelineConfig};

// External collaborator seams (engine → transport wiring)
pub use asr::{MockRecognizer, SpeechRecognizer, TranscriptSegment};
pub use langid::{Detection, LanguageDetector, MockDetector};
pub use translate::{MockTranslator, Translator};

// Session protocol
pub use protocol::{
    ClientEvent, CollectorSink, EventSink, LanguageConfigUpdate, NullSink, ServerEvent,
    decode_pcm, encode_pcm,
};

// Error handling
pub use error::{LivecapError, Result};

// Config
pub use config::Config;

// Time seam
pub use clock::{Clock, SystemClock};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
