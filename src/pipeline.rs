//! Dispatch pipeline: the per-session engine behind the event protocol.
//!
//! ```text
//!                                  ┌─ logger / partial / error events ─▶
//! audio_chunk ─▶ Accumulator ─▶ VAD ─▶ Recognizer ─▶ Reconciler ─▶ boundary
//!                    │           │    (language-detect gate may re-run)  │
//!                    │           └─ speech-end flush ──────────────┐     │
//!                    └─ staleness flush ─────────────────────┐     │     │
//!   force_process / stop_recording / watchdog ─────────▶ Dedupe ─▶ Translate ─▶ emit
//! ```
//!
//! Locking discipline: chunk ingestion is a short critical section under the
//! session mutex and is always accepted; the slow recognizer/translator
//! calls run outside it. The watchdog interleaves through the same mutex,
//! so it always observes consistent state.

use crate::asr::{SpeechRecognizer, segments_to_text};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::defaults;
use crate::langid::LanguageDetector;
use crate::protocol::{ClientEvent, EventSink, LanguageConfigUpdate, ServerEvent, decode_pcm};
use crate::session::{SessionConfig, SessionHandle, SessionStore};
use crate::text::boundary::BoundaryRules;
use crate::text::normalize::{clean_text, word_count};
use crate::text::reconcile::reconcile;
use crate::text::similarity::similarity;
use crate::translate::Translator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-session audio/VAD/language configuration.
    pub session: SessionConfig,
    /// Sample rate handed to the recognizer.
    pub sample_rate: u32,
    /// Minimum buffered samples before a window is recognized.
    pub min_window_samples: usize,
    /// Minimum buffered samples for the final pass on stop.
    pub stop_flush_min_samples: usize,
    /// Minimum interval between recognition dispatches per session.
    pub min_process_interval: Duration,
    /// Watchdog poll period.
    pub watchdog_period: Duration,
    /// Silence required before the watchdog may flush.
    pub watchdog_min_silence: Duration,
    /// Hypothesis staleness required before the watchdog may flush.
    pub watchdog_stale_after: Duration,
    /// Minimum interval between client-forced flushes.
    pub force_process_interval: Duration,
    /// Minimum interval between partial_transcription emissions.
    pub partial_update_throttle: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            sample_rate: defaults::SAMPLE_RATE,
            min_window_samples: defaults::MIN_WINDOW_SAMPLES,
            stop_flush_min_samples: defaults::STOP_FLUSH_MIN_SAMPLES,
            min_process_interval: defaults::MIN_PROCESS_INTERVAL,
            watchdog_period: defaults::WATCHDOG_PERIOD,
            watchdog_min_silence: defaults::WATCHDOG_MIN_SILENCE,
            watchdog_stale_after: defaults::WATCHDOG_STALE_AFTER,
            force_process_interval: defaults::FORCE_PROCESS_INTERVAL,
            partial_update_throttle: defaults::PARTIAL_UPDATE_THROTTLE,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            session: SessionConfig {
                window: crate::audio::WindowConfig {
                    window_samples: config.window_samples(),
                    max_age: Duration::from_millis(config.audio.max_buffer_age_ms),
                },
                vad: crate::audio::VadConfig {
                    energy_floor: config.vad.energy_floor,
                    adaptive_ratio: config.vad.adaptive_ratio,
                    history_len: config.vad.history_len,
                    min_silence: Duration::from_millis(config.vad.min_silence_ms),
                    quiet_skip_ratio: config.vad.quiet_skip_ratio,
                },
                source_language: if config.language.source == defaults::AUTO_LANGUAGE {
                    defaults::DEFAULT_SOURCE_LANGUAGE.to_string()
                } else {
                    config.language.source.clone()
                },
                target_language: config.language.target.clone(),
                auto_detect: config.language.auto_detect
                    || config.language.source == defaults::AUTO_LANGUAGE,
            },
            sample_rate: config.audio.sample_rate,
            min_window_samples: config.min_window_samples(),
            stop_flush_min_samples: config.audio.stop_flush_min_samples,
            min_process_interval: Duration::from_millis(config.timing.min_process_interval_ms),
            watchdog_period: Duration::from_millis(config.timing.watchdog_period_ms),
            watchdog_min_silence: Duration::from_millis(config.timing.watchdog_min_silence_ms),
            watchdog_stale_after: Duration::from_millis(config.timing.watchdog_stale_after_ms),
            force_process_interval: Duration::from_millis(config.timing.force_process_interval_ms),
            partial_update_throttle: Duration::from_millis(
                config.timing.partial_update_throttle_ms,
            ),
        }
    }
}

/// Everything phase 1 extracts from a session before the unlocked
/// recognition call.
struct WindowJob {
    samples: Vec<f32>,
    language_hint: Option<String>,
    wants_detection: bool,
}

/// The per-session caption/translation engine.
///
/// One instance serves every session; sessions are fully independent and
/// processed in parallel. The external engines are shared, stateless-per-call
/// services and are called concurrently across sessions.
pub struct CaptionPipeline<C: Clock = SystemClock> {
    config: PipelineConfig,
    sessions: SessionStore,
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    detector: Arc<dyn LanguageDetector>,
    events: Arc<dyn EventSink>,
    clock: C,
}

impl CaptionPipeline<SystemClock> {
    /// Creates a pipeline on the system clock.
    pub fn new(
        config: PipelineConfig,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        detector: Arc<dyn LanguageDetector>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self::with_clock(config, recognizer, translator, detector, events, SystemClock)
    }
}

impl<C: Clock + 'static> CaptionPipeline<C> {
    /// Creates a pipeline with an explicit clock (tests).
    pub fn with_clock(
        config: PipelineConfig,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        detector: Arc<dyn LanguageDetector>,
        events: Arc<dyn EventSink>,
        clock: C,
    ) -> Self {
        Self {
            sessions: SessionStore::new(config.session.clone()),
            config,
            recognizer,
            translator,
            detector,
            events,
            clock,
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Routes one protocol event to its handler.
    pub async fn handle_event(self: &Arc<Self>, session_id: &str, event: ClientEvent) {
        match event {
            ClientEvent::Connect => self.connect(session_id).await,
            ClientEvent::Disconnect => self.disconnect(session_id).await,
            ClientEvent::UpdateLanguageConfig(update) => {
                self.update_language_config(session_id, &update).await
            }
            ClientEvent::StartRecording => self.start_recording(session_id).await,
            ClientEvent::ChunkNumber { chunk } => self.chunk_number(session_id, chunk).await,
            ClientEvent::AudioChunk { data } => self.audio_chunk(session_id, &data).await,
            ClientEvent::ForceProcess => self.force_process(session_id).await,
            ClientEvent::StopRecording => self.stop_recording(session_id).await,
        }
    }

    /// Session create. Idempotent.
    pub async fn connect(&self, session_id: &str) {
        self.sessions.get_or_create(session_id, self.clock.now()).await;
        self.emit_logger(session_id, "server: client connected");
    }

    /// Session destroy: cancels the watchdog and drops the record.
    pub async fn disconnect(&self, session_id: &str) {
        self.sessions.remove(session_id).await;
        self.emit_logger(session_id, "server: client disconnected");
    }

    /// Applies a language-configuration update.
    pub async fn update_language_config(&self, session_id: &str, update: &LanguageConfigUpdate) {
        let handle = self.sessions.get_or_create(session_id, self.clock.now()).await;
        let mut state = handle.state.lock().await;
        state.lang.apply(update);

        if !crate::lang::is_known_tag(&state.lang.source) {
            // Unsupported tags still work for pass-through pairs; the ASR
            // hint falls back to English.
            tracing::warn!(session = session_id, tag = %state.lang.source, "unrecognized source language tag");
        }

        tracing::info!(
            session = session_id,
            source = %state.lang.source,
            target = %state.lang.target,
            auto_detect = state.lang.auto_detect,
            "language config updated"
        );
        let message = format!(
            "server: language config updated (source: {}, target: {}, auto-detect: {})",
            state.lang.source, state.lang.target, state.lang.auto_detect
        );
        drop(state);
        self.emit_logger(session_id, &message);
    }

    /// Resets the session and (re)starts its watchdog.
    pub async fn start_recording(self: &Arc<Self>, session_id: &str) {
        let now = self.clock.now();
        let handle = self.sessions.get_or_create(session_id, now).await;
        handle.state.lock().await.reset(now);

        self.start_watchdog(Arc::clone(&handle));

        tracing::info!(session = session_id, "start recording");
        self.emit_logger(session_id, "server: start recording");
    }

    /// Records the client-side chunk counter.
    pub async fn chunk_number(&self, session_id: &str, chunk: u64) {
        let handle = self.sessions.get_or_create(session_id, self.clock.now()).await;
        handle.state.lock().await.chunk_index = chunk;
    }

    /// Decodes and ingests a raw audio payload.
    ///
    /// A malformed payload is reported and dropped; the session continues.
    pub async fn audio_chunk(&self, session_id: &str, data: &[u8]) {
        match decode_pcm(data) {
            Ok(samples) => self.ingest_samples(session_id, &samples).await,
            Err(e) => {
                tracing::warn!(session = session_id, error = %e, payload_len = data.len(), "audio decode failed");
                self.events.emit(
                    session_id,
                    ServerEvent::Error {
                        message: format!("error processing audio chunk: {}", e),
                    },
                );
            }
        }
    }

    /// Ingests decoded samples and processes a window if one is ready.
    ///
    /// Ingestion itself is always accepted while recording; only window
    /// processing is throttled.
    pub async fn ingest_samples(&self, session_id: &str, samples: &[f32]) {
        let handle = self.sessions.get_or_create(session_id, self.clock.now()).await;

        let mut stale_flush = None;
        let window_ready = {
            let mut state = handle.state.lock().await;
            if !state.recording {
                tracing::debug!(session = session_id, "audio while not recording, dropped");
                return;
            }

            state.window.append(samples);

            // Staleness eviction: a silent, content-free connection must not
            // grow its buffer without bound. Any in-progress sentence is
            // finalized first; it is never silently dropped.
            let now = self.clock.now();
            if state.window.is_stale(now)
                && !state.voice.speech_in_progress()
                && !state.last_chunk_had_content
            {
                if !state.hypothesis.is_empty() {
                    stale_flush = Some(state.hypothesis.take_sentence());
                }
                state.window.reset(now);
                tracing::info!(session = session_id, "buffer age exceeded, buffer dropped");
            }

            state.window.ready()
        };

        if let Some(text) = stale_flush {
            self.finalize_and_dispatch(&handle, text).await;
        }

        if window_ready {
            self.process_window(&handle, false).await;
        }
    }

    /// Runs one recognition window through the pipeline.
    ///
    /// `stop_flush` bypasses the throttle and the minimum-size gate for the
    /// final pass on stop.
    async fn process_window(&self, handle: &Arc<SessionHandle>, stop_flush: bool) {
        let session_id = handle.id.as_str();

        // Phase 1, under the session lock: consume the window and update
        // voice-activity state.
        let (speech_end_flush, job) = {
            let mut state = handle.state.lock().await;
            let now = self.clock.now();

            if !stop_flush {
                if let Some(last) = state.last_processing_time
                    && now.duration_since(last) < self.config.min_process_interval
                {
                    tracing::debug!(session = session_id, "window throttled");
                    return;
                }
                state.last_processing_time = Some(now);

                if state.window.len() < self.config.min_window_samples {
                    tracing::debug!(
                        session = session_id,
                        buffered = state.window.len(),
                        "buffer too small, waiting for more audio"
                    );
                    return;
                }
            } else {
                state.last_processing_time = Some(now);
            }

            let samples = state.window.take_window();
            let verdict = state.voice.classify(&samples, now);
            tracing::debug!(
                session = session_id,
                energy = verdict.energy,
                threshold = verdict.threshold,
                speech = verdict.has_energy,
                "window classified"
            );

            let mut flush = None;
            if verdict.speech_ended && !state.hypothesis.is_empty() {
                tracing::info!(session = session_id, "speech ended, flushing sentence");
                flush = Some(state.hypothesis.take_sentence());
            }

            if verdict.skip_recognition {
                // Too quiet to be worth a recognition call.
                tracing::debug!(
                    session = session_id,
                    energy = verdict.energy,
                    "insufficient audio energy, window skipped"
                );
                (flush, None)
            } else {
                let job = WindowJob {
                    samples,
                    language_hint: state.lang.recognition_hint(),
                    wants_detection: state.lang.wants_detection(),
                };
                (flush, Some(job))
            }
        };

        if let Some(text) = speech_end_flush {
            self.finalize_and_dispatch(handle, text).await;
        }
        let Some(job) = job else { return };

        // Phase 2, unlocked: recognition.
        let segments = match self
            .recognizer
            .transcribe(&job.samples, self.config.sample_rate, job.language_hint.as_deref())
            .await
        {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!(session = session_id, error = %e, "recognition failed, cycle skipped");
                return;
            }
        };

        let mut text = segments_to_text(&segments);
        if text.is_empty() {
            tracing::debug!(session = session_id, "no text in window");
            return;
        }

        // Phase 3: one-shot language detection. The first pass ran
        // language-agnostic and is provisional; an accepted detection
        // re-recognizes the same window with the known language.
        if job.wants_detection && word_count(&text) >= defaults::MIN_DETECT_WORDS {
            match self.detect_language(handle, &text).await {
                Err(e) => {
                    tracing::warn!(session = session_id, error = %e, "language detection failed, cycle skipped");
                    return;
                }
                Ok(Some(hint)) => {
                    match self
                        .recognizer
                        .transcribe(&job.samples, self.config.sample_rate, Some(&hint))
                        .await
                    {
                        Ok(segments) => {
                            text = segments_to_text(&segments);
                            if text.is_empty() {
                                tracing::debug!(
                                    session = session_id,
                                    "no text after re-recognition"
                                );
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(session = session_id, error = %e, "re-recognition failed, cycle skipped");
                            return;
                        }
                    }
                }
                Ok(None) => {}
            }
        }

        // Phase 4, under the session lock again: fold the text into the
        // hypothesis and evaluate the flush conditions.
        self.apply_transcription(handle, &text).await;
    }

    /// Runs the language detector and stores an accepted result.
    ///
    /// Returns the new recognition hint when detection was accepted,
    /// `Ok(None)` when the guess was missing or too weak; a detector failure
    /// propagates and skips the cycle.
    async fn detect_language(
        &self,
        handle: &Arc<SessionHandle>,
        text: &str,
    ) -> crate::error::Result<Option<String>> {
        let session_id = handle.id.as_str();

        let Some(detection) = self.detector.detect(text).await? else {
            return Ok(None);
        };
        if detection.confidence <= defaults::DETECT_MIN_CONFIDENCE {
            tracing::debug!(
                session = session_id,
                language = %detection.language,
                confidence = detection.confidence,
                "detection confidence too low"
            );
            return Ok(None);
        }

        let mut state = handle.state.lock().await;
        // Another window may have won the race while the detector ran; the
        // gate fires at most once per recording.
        if !state.lang.wants_detection() {
            return Ok(None);
        }
        state
            .lang
            .accept_detection(&detection.language, detection.confidence);
        let hint = state.lang.recognition_hint();
        drop(state);

        tracing::info!(
            session = session_id,
            language = %detection.language,
            confidence = detection.confidence,
            "language detected"
        );
        self.events.emit(
            session_id,
            ServerEvent::DetectedLanguage {
                language_code: detection.language.clone(),
                confidence: detection.confidence,
            },
        );
        self.emit_logger(
            session_id,
            &format!(
                "server: detected language {} (confidence: {:.2})",
                detection.language, detection.confidence
            ),
        );

        Ok(hint)
    }

    /// Folds one cleaned window text into the session's hypothesis.
    async fn apply_transcription(&self, handle: &Arc<SessionHandle>, raw_text: &str) {
        let session_id = handle.id.as_str();
        let mut dispatches: Vec<String> = Vec::new();

        {
            let mut state = handle.state.lock().await;
            let now = self.clock.now();
            let text = clean_text(raw_text);

            // A window nearly identical to the previous one adds nothing.
            if !state.last_processed_text.is_empty()
                && similarity(&state.last_processed_text, &text)
                    > defaults::DUPLICATE_SIMILARITY
            {
                tracing::debug!(session = session_id, "near-duplicate window text ignored");
                state.hypothesis.last_update = now;
                return;
            }
            state.last_processed_text = text.clone();

            if word_count(&text) < defaults::MIN_DISPATCH_WORDS {
                tracing::debug!(session = session_id, text = %text, "window text too short");
                state.last_chunk_had_content = false;
                state.hypothesis.last_update = now;
                return;
            }

            // Advisory only: nothing gates on the verdict.
            let stable = state.hypothesis.stability.track(&text);
            tracing::debug!(session = session_id, stable, "stability observation");

            let rules = BoundaryRules::for_language(state.lang.effective_source());
            let before = state.hypothesis.current_sentence.clone();
            let outcome = reconcile(&before, &text, &rules);

            state.hypothesis.current_sentence = outcome.updated;
            if let Some(finished) = outcome.finalized {
                tracing::info!(session = session_id, sentence = %finished, "divergence finalized sentence");
                dispatches.push(finished);
            }

            if state.hypothesis.current_sentence != before {
                state.last_chunk_had_content = true;
                state.voice.mark_activity(now);
            }

            // Throttled interactive feedback.
            let partial_due = state
                .last_partial_update
                .is_none_or(|t| now.duration_since(t) >= self.config.partial_update_throttle);
            if partial_due && !state.hypothesis.is_empty() {
                self.emit_logger(
                    session_id,
                    &format!("server: recognizing: {}", state.hypothesis.current_sentence),
                );
                self.events.emit(
                    session_id,
                    ServerEvent::PartialTranscription {
                        text: state.hypothesis.current_sentence.clone(),
                        continuous: true,
                    },
                );
                state.last_partial_update = Some(now);
            }

            // Steady-state flush: a finished sentence, no speech in
            // progress, and no fresh content this tick.
            if !state.hypothesis.is_empty()
                && rules.is_sentence_end(&state.hypothesis.current_sentence)
                && !state.voice.speech_in_progress()
                && !state.last_chunk_had_content
            {
                dispatches.push(state.hypothesis.take_sentence());
            }

            state.hypothesis.last_update = now;
        }

        for text in dispatches {
            self.finalize_and_dispatch(handle, text).await;
        }
    }

    /// Client-forced flush, rate-limited.
    pub async fn force_process(&self, session_id: &str) {
        let handle = self.sessions.get_or_create(session_id, self.clock.now()).await;

        let flush = {
            let mut state = handle.state.lock().await;
            if !state.recording {
                return;
            }

            let now = self.clock.now();
            if let Some(last) = state.last_forced_process
                && now.duration_since(last) < self.config.force_process_interval
            {
                return;
            }
            state.last_forced_process = Some(now);

            // The client asked for a cut: treat speech as over so the next
            // windows start a fresh sentence.
            state.voice.end_speech();
            state.last_chunk_had_content = false;
            state
                .voice
                .force_silence(self.config.session.vad.min_silence + Duration::from_millis(500));

            if state.hypothesis.current_sentence.chars().count() >= defaults::FORCE_MIN_CHARS {
                let text = state.hypothesis.take_sentence();
                state.hypothesis.last_update = now;
                Some(text)
            } else {
                None
            }
        };

        if let Some(text) = flush {
            tracing::info!(session = session_id, text = %text, "forced flush");
            self.finalize_and_dispatch(&handle, text).await;
        }
    }

    /// Ends the recording state and flushes everything that remains.
    pub async fn stop_recording(&self, session_id: &str) {
        let handle = self.sessions.get_or_create(session_id, self.clock.now()).await;

        let run_final_pass = {
            let mut state = handle.state.lock().await;
            state.recording = false;
            state.window.len() >= self.config.stop_flush_min_samples
        };

        tracing::info!(session = session_id, "stop recording");
        self.emit_logger(session_id, "server: stop recording");

        // One last recognition pass over the remaining audio, then an
        // unconditional hypothesis flush. The watchdog sees the cleared
        // recording flag on its next tick and stops itself.
        if run_final_pass {
            self.process_window(&handle, true).await;
        }

        let remaining = {
            let mut state = handle.state.lock().await;
            if state.hypothesis.is_empty() {
                None
            } else {
                Some(state.hypothesis.take_sentence())
            }
        };
        if let Some(text) = remaining {
            self.finalize_and_dispatch(&handle, text).await;
        }
    }

    /// Dedupes, translates, and emits one finalized sentence.
    async fn finalize_and_dispatch(&self, handle: &Arc<SessionHandle>, text: String) {
        let session_id = handle.id.as_str();
        let text = clean_text(&text);

        if word_count(&text) < defaults::MIN_DISPATCH_WORDS {
            return;
        }

        // Transcript gate. Recording the text before translating keeps a
        // concurrent dispatch of the same sentence from slipping through.
        let (source, target) = {
            let mut state = handle.state.lock().await;
            if state.transcripts.is_duplicate(&text) {
                tracing::info!(session = session_id, text = %text, "duplicate transcript suppressed");
                return;
            }
            state.transcripts.push(text.clone());
            (
                state.lang.effective_source().to_string(),
                state.lang.target.clone(),
            )
        };

        let translation = if source == target {
            tracing::debug!(session = session_id, language = %source, "same source and target, translation skipped");
            text.clone()
        } else {
            match self.translator.translate(&text, &source, &target).await {
                Ok(translation) => translation,
                Err(e) => {
                    tracing::warn!(session = session_id, error = %e, "translation failed, cycle skipped");
                    return;
                }
            }
        };

        // Translation gate.
        {
            let mut state = handle.state.lock().await;
            if state.translations.is_duplicate(&translation) {
                tracing::info!(session = session_id, "duplicate translation suppressed");
                return;
            }
            state.translations.push(translation.clone());
        }

        self.events.emit(
            session_id,
            ServerEvent::Translation {
                text,
                translation: translation.clone(),
            },
        );
        self.emit_logger(session_id, &format!("server: translation: {}", translation));
    }

    /// One watchdog firing. Returns false when the watchdog should stop.
    async fn watchdog_tick(&self, handle: &Arc<SessionHandle>) -> bool {
        let session_id = handle.id.as_str();

        let flush = {
            let mut state = handle.state.lock().await;
            if !state.recording {
                return false;
            }

            let now = self.clock.now();
            if state.voice.speech_in_progress() {
                None
            } else if now.duration_since(state.voice.last_voice_activity())
                < self.config.watchdog_min_silence
            {
                None
            } else if !state.hypothesis.is_empty()
                && now.duration_since(state.hypothesis.last_update)
                    > self.config.watchdog_stale_after
                && word_count(&state.hypothesis.current_sentence) >= defaults::WATCHDOG_MIN_WORDS
            {
                let text = state.hypothesis.take_sentence();
                state.hypothesis.last_update = now;
                state.hypothesis.stability.reset_counter();
                Some(text)
            } else {
                None
            }
        };

        if let Some(text) = flush {
            tracing::info!(session = session_id, text = %text, "watchdog flush");
            self.finalize_and_dispatch(handle, text).await;
        }
        true
    }

    /// Spawns the session's periodic watchdog.
    ///
    /// The task re-checks session existence through the store before every
    /// tick, so it can never race a disconnect into reviving a dead session;
    /// cancellation arrives through the handle's watch channel. Dispatch
    /// failures inside a tick are logged and never stop the schedule.
    fn start_watchdog(self: &Arc<Self>, handle: Arc<SessionHandle>) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        handle.install_watchdog(shutdown_tx);

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(pipeline.config.watchdog_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; the loop below starts
            // with a full period.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if pipeline.sessions.get(&handle.id).await.is_none() {
                            break;
                        }
                        if !pipeline.watchdog_tick(&handle).await {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(session = %handle.id, "watchdog stopped");
        });
    }

    fn emit_logger(&self, session_id: &str, message: &str) {
        self.events.emit(
            session_id,
            ServerEvent::Logger {
                message: message.to_string(),
            },
        );
    }
}
