//! Per-session mutable state.
//!
//! One fixed-shape record per connection, owned by the session store and
//! mutated only under the session's own mutex. No session state survives a
//! reconnect.

use crate::audio::{VadConfig, VoiceActivity, WindowAccumulator, WindowConfig};
use crate::defaults;
use crate::lang;
use crate::protocol::LanguageConfigUpdate;
use crate::text::dedupe::EmissionHistory;
use crate::text::stability::StabilityTracker;
use std::time::Instant;

/// Static per-session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Window accumulation policy.
    pub window: WindowConfig,
    /// Voice-activity policy.
    pub vad: VadConfig,
    /// Initial source language tag.
    pub source_language: String,
    /// Initial target language tag.
    pub target_language: String,
    /// Whether language auto-detection starts enabled.
    pub auto_detect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            vad: VadConfig::default(),
            source_language: defaults::DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: defaults::DEFAULT_TARGET_LANGUAGE.to_string(),
            auto_detect: true,
        }
    }
}

/// Language configuration and detection state.
#[derive(Debug, Clone)]
pub struct LanguageState {
    /// Configured source language tag.
    pub source: String,
    /// Configured target language tag.
    pub target: String,
    /// Whether auto-detection is enabled.
    pub auto_detect: bool,
    /// Detected language tag, set at most once per recording.
    pub detected: Option<String>,
    /// Detector confidence for `detected`.
    pub confidence: f32,
    /// Recognition-engine language code derived from config or detection.
    pub asr_hint: Option<String>,
}

impl LanguageState {
    fn new(config: &SessionConfig) -> Self {
        let asr_hint = if config.auto_detect {
            None
        } else {
            Some(lang::asr_code_for_tag(&config.source_language).to_string())
        };
        Self {
            source: config.source_language.clone(),
            target: config.target_language.clone(),
            auto_detect: config.auto_detect,
            detected: None,
            confidence: 0.0,
            asr_hint,
        }
    }

    /// Applies an `update_language_config` request.
    pub fn apply(&mut self, update: &LanguageConfigUpdate) {
        if let Some(src) = &update.source_language {
            if src == defaults::AUTO_LANGUAGE {
                self.auto_detect = true;
                self.detected = None;
                self.confidence = 0.0;
                self.asr_hint = None;
            } else {
                self.source = src.clone();
                self.auto_detect = false;
                self.asr_hint = Some(lang::asr_code_for_tag(src).to_string());
            }
        }

        if let Some(tgt) = &update.target_language {
            self.target = tgt.clone();
        }

        if let Some(auto) = update.auto_detect {
            self.auto_detect = auto;
            if !auto
                && let Some(src) = &update.source_language
                && src != defaults::AUTO_LANGUAGE
            {
                self.source = src.clone();
                self.asr_hint = Some(lang::asr_code_for_tag(src).to_string());
            }
        }
    }

    /// The tag translations are made from: the detected language when
    /// auto-detecting, the configured source otherwise.
    pub fn effective_source(&self) -> &str {
        if self.auto_detect
            && let Some(detected) = &self.detected
        {
            return detected;
        }
        &self.source
    }

    /// Language hint for the next recognition call.
    ///
    /// Auto-detect before any detection runs language-agnostic (`None`);
    /// afterwards it pins the detected language. Manual configuration always
    /// pins the configured source.
    pub fn recognition_hint(&self) -> Option<String> {
        if self.auto_detect {
            if self.detected.is_some() {
                self.asr_hint.clone()
            } else {
                None
            }
        } else {
            Some(lang::asr_code_for_tag(&self.source).to_string())
        }
    }

    /// True while the one-shot detection gate is still open.
    pub fn wants_detection(&self) -> bool {
        self.auto_detect && self.detected.is_none()
    }

    /// Records an accepted detection and derives the recognition hint.
    pub fn accept_detection(&mut self, language: &str, confidence: f32) {
        self.detected = Some(language.to_string());
        self.confidence = confidence;
        self.asr_hint = Some(lang::asr_code_for_tag(language).to_string());
    }

    /// Clears detection state for a new recording.
    pub fn reset_detection(&mut self) {
        self.detected = None;
        self.confidence = 0.0;
    }
}

/// The in-progress sentence for a session.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    /// The reconciled sentence text, the single source of truth emitted to
    /// the client and eventually translated.
    pub current_sentence: String,
    /// Advisory stability bookkeeping over raw window texts.
    pub stability: StabilityTracker,
    /// When the sentence last changed (or was last flushed).
    pub last_update: Instant,
}

impl Hypothesis {
    fn new(now: Instant) -> Self {
        Self {
            current_sentence: String::new(),
            stability: StabilityTracker::new(),
            last_update: now,
        }
    }

    /// Returns true while no sentence is in progress.
    pub fn is_empty(&self) -> bool {
        self.current_sentence.is_empty()
    }

    /// Takes the sentence for dispatch, leaving the hypothesis empty.
    ///
    /// The only way a sentence leaves the hypothesis: it is never silently
    /// dropped.
    pub fn take_sentence(&mut self) -> String {
        std::mem::take(&mut self.current_sentence)
    }

    fn reset(&mut self, now: Instant) {
        self.current_sentence.clear();
        self.stability.reset();
        self.last_update = now;
    }
}

/// All mutable state of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Recording gate: no audio or window processing while false.
    pub recording: bool,
    /// Audio buffer with overlap-preserving consumption.
    pub window: WindowAccumulator,
    /// Energy-based speech/silence tracking.
    pub voice: VoiceActivity,
    /// Language configuration and detection state.
    pub lang: LanguageState,
    /// The in-progress sentence.
    pub hypothesis: Hypothesis,
    /// Dedupe history of dispatched transcripts.
    pub transcripts: EmissionHistory,
    /// Dedupe history of dispatched translations.
    pub translations: EmissionHistory,
    /// Last window text that reached segmentation (near-dup suppression).
    pub last_processed_text: String,
    /// Whether the last processed window changed the hypothesis.
    pub last_chunk_had_content: bool,
    /// Client-reported chunk counter (telemetry only).
    pub chunk_index: u64,
    /// When a window was last dispatched to recognition.
    pub last_processing_time: Option<Instant>,
    /// When a forced flush last ran.
    pub last_forced_process: Option<Instant>,
    /// When a partial_transcription was last emitted.
    pub last_partial_update: Option<Instant>,
}

impl SessionState {
    /// Creates the state for a freshly connected session.
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        Self {
            recording: false,
            window: WindowAccumulator::new(config.window, now),
            voice: VoiceActivity::new(config.vad, now),
            lang: LanguageState::new(&config),
            hypothesis: Hypothesis::new(now),
            transcripts: EmissionHistory::new(),
            translations: EmissionHistory::new(),
            last_processed_text: String::new(),
            last_chunk_had_content: false,
            chunk_index: 0,
            last_processing_time: None,
            last_forced_process: None,
            last_partial_update: None,
        }
    }

    /// Full reset for `start_recording`.
    ///
    /// Every transient field reinitializes; language configuration survives,
    /// detection state does not.
    pub fn reset(&mut self, now: Instant) {
        self.recording = true;
        self.window.reset(now);
        self.voice.reset(now);
        self.lang.reset_detection();
        self.hypothesis.reset(now);
        self.transcripts.clear();
        self.translations.clear();
        self.last_processed_text.clear();
        self.last_chunk_had_content = false;
        self.chunk_index = 0;
        self.last_processing_time = None;
        self.last_forced_process = Some(now);
        self.last_partial_update = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(SessionConfig::default(), Instant::now())
    }

    #[test]
    fn test_new_session_is_not_recording() {
        let state = state();
        assert!(!state.recording);
        assert!(state.window.is_empty());
        assert!(state.hypothesis.is_empty());
    }

    #[test]
    fn test_default_language_setup() {
        let state = state();
        assert_eq!(state.lang.source, "eng_Latn");
        assert_eq!(state.lang.target, "kor_Hang");
        assert!(state.lang.auto_detect);
        assert!(state.lang.wants_detection());
        assert_eq!(state.lang.recognition_hint(), None);
    }

    #[test]
    fn test_manual_source_pins_hint() {
        let mut state = state();
        state.lang.apply(&LanguageConfigUpdate {
            source_language: Some("deu_Latn".to_string()),
            target_language: None,
            auto_detect: None,
        });

        assert!(!state.lang.auto_detect);
        assert_eq!(state.lang.recognition_hint(), Some("de".to_string()));
        assert_eq!(state.lang.effective_source(), "deu_Latn");
        assert!(!state.lang.wants_detection());
    }

    #[test]
    fn test_auto_source_clears_detection() {
        let mut state = state();
        state.lang.accept_detection("jpn_Jpan", 0.8);
        assert_eq!(state.lang.recognition_hint(), Some("ja".to_string()));

        state.lang.apply(&LanguageConfigUpdate {
            source_language: Some("auto".to_string()),
            target_language: None,
            auto_detect: None,
        });

        assert!(state.lang.auto_detect);
        assert_eq!(state.lang.detected, None);
        assert_eq!(state.lang.recognition_hint(), None);
        assert!(state.lang.wants_detection());
    }

    #[test]
    fn test_target_language_update() {
        let mut state = state();
        state.lang.apply(&LanguageConfigUpdate {
            source_language: None,
            target_language: Some("fra_Latn".to_string()),
            auto_detect: None,
        });
        assert_eq!(state.lang.target, "fra_Latn");
    }

    #[test]
    fn test_explicit_pin_with_auto_detect_false() {
        let mut state = state();
        state.lang.apply(&LanguageConfigUpdate {
            source_language: Some("spa_Latn".to_string()),
            target_language: None,
            auto_detect: Some(false),
        });

        assert!(!state.lang.auto_detect);
        assert_eq!(state.lang.source, "spa_Latn");
        assert_eq!(state.lang.recognition_hint(), Some("es".to_string()));
    }

    #[test]
    fn test_detection_drives_effective_source() {
        let mut state = state();
        assert_eq!(state.lang.effective_source(), "eng_Latn");

        state.lang.accept_detection("kor_Hang", 0.7);
        assert_eq!(state.lang.effective_source(), "kor_Hang");
        assert!((state.lang.confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset_reinitializes_transients() {
        let now = Instant::now();
        let mut state = SessionState::new(SessionConfig::default(), now);

        state.window.append(&[0.1; 100]);
        state.hypothesis.current_sentence = "left over".to_string();
        state.transcripts.push("old".to_string());
        state.lang.accept_detection("jpn_Jpan", 0.9);
        state.chunk_index = 9;
        state.last_chunk_had_content = true;

        state.reset(now);

        assert!(state.recording);
        assert!(state.window.is_empty());
        assert!(state.hypothesis.is_empty());
        assert!(state.transcripts.is_empty());
        assert_eq!(state.lang.detected, None);
        assert_eq!(state.chunk_index, 0);
        assert!(!state.last_chunk_had_content);
        assert_eq!(state.last_forced_process, Some(now));
    }

    #[test]
    fn test_reset_keeps_language_config() {
        let mut state = state();
        state.lang.apply(&LanguageConfigUpdate {
            source_language: Some("deu_Latn".to_string()),
            target_language: Some("fra_Latn".to_string()),
            auto_detect: None,
        });

        state.reset(Instant::now());

        assert_eq!(state.lang.source, "deu_Latn");
        assert_eq!(state.lang.target, "fra_Latn");
        assert!(!state.lang.auto_detect);
    }

    #[test]
    fn test_take_sentence_clears_hypothesis() {
        let mut state = state();
        state.hypothesis.current_sentence = "a finished sentence.".to_string();

        let taken = state.hypothesis.take_sentence();
        assert_eq!(taken, "a finished sentence.");
        assert!(state.hypothesis.is_empty());
    }
}
