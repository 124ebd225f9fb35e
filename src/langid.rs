//! Language-identification seam.

use crate::error::{LivecapError, Result};
use std::sync::Mutex;

/// A language guess from the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Detected language as a translation-style tag (e.g. `kor_Hang`).
    pub language: String,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

/// Trait for text-based language identification.
///
/// A failed or unavailable detection is `Ok(None)` (or a default tag with
/// zero confidence, which the gate treats the same way).
#[async_trait::async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Guesses the language of `text`.
    async fn detect(&self, text: &str) -> Result<Option<Detection>>;
}

/// Mock detector for testing.
pub struct MockDetector {
    detection: Option<Detection>,
    should_fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockDetector {
    /// Creates a mock that never detects anything.
    pub fn undetected() -> Self {
        Self {
            detection: None,
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock returning a fixed detection.
    pub fn detecting(language: &str, confidence: f32) -> Self {
        Self {
            detection: Some(Detection {
                language: language.to_string(),
                confidence,
            }),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configures the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Texts the detector was asked about, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl LanguageDetector for MockDetector {
    async fn detect(&self, text: &str) -> Result<Option<Detection>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(text.to_string());

        if self.should_fail {
            return Err(LivecapError::Detection {
                message: "mock detection failure".to_string(),
            });
        }

        Ok(self.detection.clone())
    }
}
