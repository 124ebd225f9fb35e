//! Voice-activity tracking.
//!
//! Energy-based speech/silence classification with an adaptive threshold:
//! each window's RMS energy joins a bounded rolling history, and the
//! threshold rides at a fraction of the rolling mean so it tracks ambient
//! loudness instead of sitting at a fixed level. A floor keeps it from
//! collapsing in dead-quiet rooms.

use crate::defaults;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Configuration for the voice-activity tracker.
#[derive(Debug, Clone, Copy)]
pub struct VadConfig {
    /// Absolute threshold floor.
    pub energy_floor: f32,
    /// Fraction of the rolling mean used as the threshold.
    pub adaptive_ratio: f32,
    /// Rolling energy history capacity.
    pub history_len: usize,
    /// Silence duration that ends in-progress speech.
    pub min_silence: Duration,
    /// Windows below this fraction of the threshold skip recognition.
    pub quiet_skip_ratio: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_floor: defaults::ENERGY_FLOOR,
            adaptive_ratio: defaults::ADAPTIVE_ENERGY_RATIO,
            history_len: defaults::ENERGY_HISTORY_LEN,
            min_silence: defaults::MIN_SILENCE_FOR_PROCESSING,
            quiet_skip_ratio: defaults::QUIET_SKIP_RATIO,
        }
    }
}

/// Classification of one recognition window.
#[derive(Debug, Clone, Copy)]
pub struct VadVerdict {
    /// RMS energy of the window.
    pub energy: f32,
    /// Adaptive threshold the window was judged against.
    pub threshold: f32,
    /// Whether the window carries speech energy.
    pub has_energy: bool,
    /// Whether this window crossed the speech-end silence threshold.
    ///
    /// The caller must finalize any in-progress hypothesis on this event.
    pub speech_ended: bool,
    /// Whether the window is quiet enough to skip recognition entirely.
    pub skip_recognition: bool,
}

/// Per-session voice-activity state.
#[derive(Debug, Clone)]
pub struct VoiceActivity {
    config: VadConfig,
    energy_history: VecDeque<f32>,
    last_voice_activity: Instant,
    silence_duration: Duration,
    speech_in_progress: bool,
    continuous_chunk_count: u32,
}

impl VoiceActivity {
    /// Creates a fresh tracker.
    pub fn new(config: VadConfig, now: Instant) -> Self {
        Self {
            config,
            energy_history: VecDeque::with_capacity(config.history_len),
            last_voice_activity: now,
            silence_duration: Duration::ZERO,
            speech_in_progress: false,
            continuous_chunk_count: 0,
        }
    }

    /// Classifies a window and updates speech/silence state.
    pub fn classify(&mut self, samples: &[f32], now: Instant) -> VadVerdict {
        let energy = calculate_rms(samples);

        self.energy_history.push_back(energy);
        while self.energy_history.len() > self.config.history_len {
            self.energy_history.pop_front();
        }

        let threshold =
            (self.mean_energy() * self.config.adaptive_ratio).max(self.config.energy_floor);
        let has_energy = energy > threshold;

        let mut speech_ended = false;
        let mut skip_recognition = false;

        if has_energy {
            self.last_voice_activity = now;
            self.silence_duration = Duration::ZERO;
            self.speech_in_progress = true;
            self.continuous_chunk_count += 1;
        } else {
            self.silence_duration = now.duration_since(self.last_voice_activity);

            if self.silence_duration > self.config.min_silence && self.speech_in_progress {
                self.speech_in_progress = false;
                self.continuous_chunk_count = 0;
                speech_ended = true;
            }

            skip_recognition = energy < threshold * self.config.quiet_skip_ratio;
        }

        VadVerdict {
            energy,
            threshold,
            has_energy,
            speech_ended,
            skip_recognition,
        }
    }

    /// Records non-acoustic evidence of activity (hypothesis content change).
    pub fn mark_activity(&mut self, now: Instant) {
        self.last_voice_activity = now;
    }

    /// Time of the last voice activity (acoustic or content-driven).
    pub fn last_voice_activity(&self) -> Instant {
        self.last_voice_activity
    }

    /// Current accumulated silence duration.
    pub fn silence_duration(&self) -> Duration {
        self.silence_duration
    }

    /// Forces the silence duration (forced-flush path).
    pub fn force_silence(&mut self, duration: Duration) {
        self.silence_duration = duration;
    }

    /// Whether speech is currently in progress.
    pub fn speech_in_progress(&self) -> bool {
        self.speech_in_progress
    }

    /// Clears the in-progress flag (forced-flush path).
    pub fn end_speech(&mut self) {
        self.speech_in_progress = false;
    }

    /// Consecutive energetic windows seen so far.
    pub fn continuous_chunk_count(&self) -> u32 {
        self.continuous_chunk_count
    }

    /// Mean of the rolling energy history.
    fn mean_energy(&self) -> f32 {
        if self.energy_history.is_empty() {
            return defaults::FALLBACK_MEAN_ENERGY;
        }
        self.energy_history.iter().sum::<f32>() / self.energy_history.len() as f32
    }

    /// Resets all state (session restart).
    pub fn reset(&mut self, now: Instant) {
        self.energy_history.clear();
        self.last_voice_activity = now;
        self.silence_duration = Duration::ZERO;
        self.speech_in_progress = false;
        self.continuous_chunk_count = 0;
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Samples are normalized f32 in [-1.0, 1.0]; the result is 0.0 for silence
/// and ~0.707 for a full-scale sine wave.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(level: f32) -> Vec<f32> {
        vec![level; 1000]
    }

    fn tracker() -> (VoiceActivity, Instant) {
        let now = Instant::now();
        (VoiceActivity::new(VadConfig::default(), now), now)
    }

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(calculate_rms(&window(0.0)), 0.0);
    }

    #[test]
    fn test_rms_constant_signal() {
        let rms = calculate_rms(&window(0.01));
        assert!((rms - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_rms_negative_samples() {
        let rms = calculate_rms(&window(-0.01));
        assert!((rms - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_rms_empty() {
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn test_first_loud_window_is_speech() {
        let (mut vad, now) = tracker();
        let verdict = vad.classify(&window(0.01), now);
        // History [0.01]: threshold = 0.8 * 0.01 = 0.008.
        assert!(verdict.has_energy);
        assert!(vad.speech_in_progress());
        assert_eq!(vad.continuous_chunk_count(), 1);
    }

    #[test]
    fn test_threshold_never_below_floor() {
        let (mut vad, now) = tracker();
        let verdict = vad.classify(&window(0.0001), now);
        assert!((verdict.threshold - defaults::ENERGY_FLOOR).abs() < 1e-6);
        assert!(!verdict.has_energy);
    }

    #[test]
    fn test_adaptive_threshold_rides_ambient_level() {
        let (mut vad, now) = tracker();

        // Five windows around 0.01 raise the rolling mean.
        for _ in 0..5 {
            let verdict = vad.classify(&window(0.01), now);
            assert!(verdict.has_energy);
        }

        // 0.002 would clear the 0.005 floor against silence, but the
        // threshold now rides at 80% of the rolling mean.
        let verdict = vad.classify(&window(0.002), now);
        assert!(verdict.threshold > 0.005);
        assert!(!verdict.has_energy);
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut vad, now) = tracker();
        for _ in 0..25 {
            vad.classify(&window(0.01), now);
        }
        assert!(vad.energy_history.len() <= defaults::ENERGY_HISTORY_LEN);
    }

    #[test]
    fn test_speech_end_after_sustained_silence() {
        let (mut vad, start) = tracker();

        vad.classify(&window(0.05), start);
        assert!(vad.speech_in_progress());

        // Silence immediately after speech: not ended yet.
        let verdict = vad.classify(&window(0.0), start + Duration::from_secs(1));
        assert!(!verdict.speech_ended);
        assert!(vad.speech_in_progress());
        assert_eq!(vad.silence_duration(), Duration::from_secs(1));

        // Past the 2.5s silence threshold: speech-end event.
        let verdict = vad.classify(&window(0.0), start + Duration::from_secs(3));
        assert!(verdict.speech_ended);
        assert!(!vad.speech_in_progress());
        assert_eq!(vad.continuous_chunk_count(), 0);
    }

    #[test]
    fn test_speech_end_fires_once() {
        let (mut vad, start) = tracker();

        vad.classify(&window(0.05), start);
        let verdict = vad.classify(&window(0.0), start + Duration::from_secs(3));
        assert!(verdict.speech_ended);

        let verdict = vad.classify(&window(0.0), start + Duration::from_secs(5));
        assert!(!verdict.speech_ended);
    }

    #[test]
    fn test_very_quiet_window_skips_recognition() {
        let (mut vad, now) = tracker();
        for _ in 0..5 {
            vad.classify(&window(0.01), now);
        }

        // Well below half the threshold.
        let verdict = vad.classify(&window(0.001), now);
        assert!(!verdict.has_energy);
        assert!(verdict.skip_recognition);
    }

    #[test]
    fn test_borderline_quiet_window_still_recognized() {
        let (mut vad, now) = tracker();
        for _ in 0..5 {
            vad.classify(&window(0.01), now);
        }

        // Below threshold but above half of it: silence, no skip.
        let verdict = vad.classify(&window(0.006), now);
        assert!(!verdict.has_energy);
        assert!(!verdict.skip_recognition);
    }

    #[test]
    fn test_mark_activity_refreshes_timestamp() {
        let (mut vad, start) = tracker();
        vad.classify(&window(0.05), start);

        let later = start + Duration::from_secs(2);
        vad.mark_activity(later);
        assert_eq!(vad.last_voice_activity(), later);

        // Silence measured from the refreshed timestamp stays short.
        let verdict = vad.classify(&window(0.0), later + Duration::from_secs(1));
        assert!(!verdict.speech_ended);
    }

    #[test]
    fn test_reset() {
        let (mut vad, start) = tracker();
        vad.classify(&window(0.05), start);
        assert!(vad.speech_in_progress());

        let later = start + Duration::from_secs(7);
        vad.reset(later);
        assert!(!vad.speech_in_progress());
        assert_eq!(vad.continuous_chunk_count(), 0);
        assert_eq!(vad.last_voice_activity(), later);
        assert!(vad.energy_history.is_empty());
    }
}
