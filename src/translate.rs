//! Translation seam.

use crate::error::{LivecapError, Result};
use std::sync::Mutex;

/// Trait for text translation between language tags.
///
/// Implementations are shared, stateless-per-call services; concurrent
/// sessions call them concurrently. The dispatch pipeline never calls the
/// translator when source and target tags are equal.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` from `source_tag` to `target_tag`.
    async fn translate(&self, text: &str, source_tag: &str, target_tag: &str) -> Result<String>;
}

/// Mock translator for testing.
///
/// Wraps the input in a `[target]`-prefixed string so tests can assert both
/// that translation happened and what pair was requested. Records every
/// call.
pub struct MockTranslator {
    should_fail: bool,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    /// Creates a mock translator.
    pub fn new() -> Self {
        Self {
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configures the mock to fail on every call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Calls received so far as (text, source, target) tuples.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, source_tag: &str, target_tag: &str) -> Result<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push((
            text.to_string(),
            source_tag.to_string(),
            target_tag.to_string(),
        ));

        if self.should_fail {
            return Err(LivecapError::Translation {
                message: "mock translation failure".to_string(),
            });
        }

        Ok(format!("[{}] {}", target_tag, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_translator_wraps_text() {
        let translator = MockTranslator::new();
        let result = translator
            .translate("hello", "eng_Latn", "kor_Hang")
            .await
            .unwrap();
        assert_eq!(result, "[kor_Hang] hello");
    }

    #[tokio::test]
    async fn test_mock_translator_records_calls() {
        let translator = MockTranslator::new();
        translator
            .translate("one", "eng_Latn", "kor_Hang")
            .await
            .unwrap();
        translator
            .translate("two", "deu_Latn", "eng_Latn")
            .await
            .unwrap();

        let calls = translator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "one");
        assert_eq!(calls[1].1, "deu_Latn");
    }

    #[tokio::test]
    async fn test_mock_translator_failure() {
        let translator = MockTranslator::new().with_failure();
        let result = translator.translate("hello", "eng_Latn", "kor_Hang").await;
        assert!(matches!(result, Err(LivecapError::Translation { .. })));
    }

    #[test]
    fn test_translator_trait_is_object_safe() {
        let _translator: Box<dyn Translator> = Box::new(MockTranslator::new());
    }
}
