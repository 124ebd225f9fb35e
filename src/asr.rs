//! Speech-recognition seam.
//!
//! The engine never runs a model itself; a transport wires in whatever
//! recognizer it has behind this trait. Calls are async because recognition
//! is the slow part of the pipeline and must not pin an executor thread.

use crate::defaults;
use crate::error::{LivecapError, Result};
use crate::text::normalize::{clean_text, collapse_stutter};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recognized segment of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Recognized text.
    pub text: String,
    /// Average log-probability reported by the engine.
    pub avg_logprob: f32,
    /// Segment start within the window, in seconds.
    pub start: f32,
    /// Segment end within the window, in seconds.
    pub end: f32,
}

/// Trait for speech-to-text recognition.
///
/// This trait allows swapping implementations (a real engine vs a mock).
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribes one window of audio.
    ///
    /// # Arguments
    /// * `samples` - Mono f32 samples at `sample_rate`
    /// * `sample_rate` - Sample rate in Hz
    /// * `language` - Optional language hint (short code, e.g. "en");
    ///   `None` lets the engine guess
    async fn transcribe(
        &self,
        samples: &[f32],
        sample_rate: u32,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Collapses recognition segments into one cleaned window text.
///
/// Low-confidence segments (`avg_logprob < -1.0`) and near-empty segments
/// are dropped before reconciliation ever sees them; surviving segments get
/// stutter-collapsed and joined.
pub fn segments_to_text(segments: &[TranscriptSegment]) -> String {
    let mut texts = Vec::new();

    for segment in segments {
        if segment.avg_logprob < defaults::SEGMENT_MIN_LOGPROB {
            continue;
        }
        let trimmed = segment.text.trim();
        if trimmed.chars().count() < defaults::SEGMENT_MIN_CHARS {
            continue;
        }

        let collapsed = collapse_stutter(trimmed);
        if !collapsed.is_empty() {
            texts.push(collapsed);
        }
    }

    clean_text(&texts.join(" "))
}

/// Mock recognizer for testing.
///
/// Responds with a fixed text, or with a scripted sequence of texts (one
/// per call) to simulate successive overlapping windows. Records the
/// language hint of every call.
pub struct MockRecognizer {
    scripted: Mutex<VecDeque<String>>,
    fixed_response: Option<String>,
    should_fail: bool,
    seen_languages: Mutex<Vec<Option<String>>>,
}

impl MockRecognizer {
    /// Creates a mock that answers every call with the same text.
    pub fn new(response: &str) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fixed_response: Some(response.to_string()),
            should_fail: false,
            seen_languages: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock that answers calls with a scripted sequence, then
    /// with empty results once the script runs out.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scripted: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fixed_response: None,
            should_fail: false,
            seen_languages: Mutex::new(Vec::new()),
        }
    }

    /// Configures the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Language hints received so far, in call order.
    pub fn seen_languages(&self) -> Vec<Option<String>> {
        self.seen_languages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn segment(text: String, sample_count: usize, sample_rate: u32) -> TranscriptSegment {
        TranscriptSegment {
            text,
            avg_logprob: -0.2,
            start: 0.0,
            end: sample_count as f32 / sample_rate as f32,
        }
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn transcribe(
        &self,
        samples: &[f32],
        sample_rate: u32,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        self.seen_languages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(language.map(|l| l.to_string()));

        if self.should_fail {
            return Err(LivecapError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }

        let next = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .or_else(|| self.fixed_response.clone());

        Ok(match next {
            Some(text) => vec![Self::segment(text, samples.len(), sample_rate)],
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, avg_logprob: f32) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            avg_logprob,
            start: 0.0,
            end: 1.0,
        }
    }

    #[test]
    fn test_segments_to_text_joins_segments() {
        let segments = vec![segment("hello how", -0.1), segment("are you", -0.3)];
        assert_eq!(segments_to_text(&segments), "hello how are you");
    }

    #[test]
    fn test_segments_to_text_drops_low_confidence() {
        let segments = vec![segment("hello there", -0.1), segment("noise", -1.5)];
        assert_eq!(segments_to_text(&segments), "hello there");
    }

    #[test]
    fn test_segments_to_text_drops_near_empty() {
        let segments = vec![segment("a", -0.1), segment("real words here", -0.1)];
        assert_eq!(segments_to_text(&segments), "real words here");
    }

    #[test]
    fn test_segments_to_text_collapses_stutter() {
        let segments = vec![segment("the the quick brown fox", -0.1)];
        assert_eq!(segments_to_text(&segments), "the quick brown fox");
    }

    #[test]
    fn test_segments_to_text_empty_input() {
        assert_eq!(segments_to_text(&[]), "");
    }

    #[test]
    fn test_segments_to_text_all_filtered() {
        let segments = vec![segment("x", -0.1), segment("mumble", -2.0)];
        assert_eq!(segments_to_text(&segments), "");
    }

    #[tokio::test]
    async fn test_mock_recognizer_fixed_response() {
        let recognizer = MockRecognizer::new("hello world");
        let segments = recognizer.transcribe(&[0.0; 100], 16000, None).await.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello world");
    }

    #[tokio::test]
    async fn test_mock_recognizer_scripted_sequence() {
        let recognizer = MockRecognizer::scripted(["first", "second"]);

        let a = recognizer.transcribe(&[0.0; 100], 16000, None).await.unwrap();
        let b = recognizer.transcribe(&[0.0; 100], 16000, None).await.unwrap();
        let c = recognizer.transcribe(&[0.0; 100], 16000, None).await.unwrap();

        assert_eq!(a[0].text, "first");
        assert_eq!(b[0].text, "second");
        assert!(c.is_empty());
    }

    #[tokio::test]
    async fn test_mock_recognizer_records_language_hints() {
        let recognizer = MockRecognizer::new("text");
        recognizer
            .transcribe(&[0.0; 100], 16000, None)
            .await
            .unwrap();
        recognizer
            .transcribe(&[0.0; 100], 16000, Some("ko"))
            .await
            .unwrap();

        assert_eq!(
            recognizer.seen_languages(),
            vec![None, Some("ko".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mock_recognizer_failure() {
        let recognizer = MockRecognizer::new("text").with_failure();
        let result = recognizer.transcribe(&[0.0; 100], 16000, None).await;
        assert!(matches!(
            result,
            Err(LivecapError::Recognition { .. })
        ));
    }

    #[test]
    fn test_recognizer_trait_is_object_safe() {
        let _recognizer: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer::new("boxed"));
    }
}
