//! Session control protocol.
//!
//! JSON message types for the event protocol riding on a persistent
//! per-client connection. The transport itself is out of scope; whatever
//! carries these events (websocket, unix socket, in-process channel) calls
//! into [`crate::pipeline::CaptionPipeline`] with `ClientEvent`s and passes
//! an [`EventSink`] for the server-emitted side.

use crate::error::{LivecapError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Language-configuration update payload.
///
/// Field names follow the wire protocol's camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfigUpdate {
    /// New source language tag, or `"auto"` to enable detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// New target language tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Explicit auto-detect toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect: Option<bool>,
}

/// Events sent by a client to its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Session create (idempotent).
    Connect,
    /// Session destroy.
    Disconnect,
    /// Update the session's language configuration.
    UpdateLanguageConfig(LanguageConfigUpdate),
    /// Reset the session and start accepting audio.
    StartRecording,
    /// Client-side chunk counter (bookkeeping only).
    ChunkNumber { chunk: u64 },
    /// Raw audio payload: little-endian f32 mono samples.
    AudioChunk { data: Vec<u8> },
    /// Force a flush of the current hypothesis.
    ForceProcess,
    /// Stop recording and flush everything that remains.
    StopRecording,
}

impl ClientEvent {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Events emitted by the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Diagnostic stream.
    Logger { message: String },
    /// Throttled in-progress hypothesis update.
    PartialTranscription { text: String, continuous: bool },
    /// One-shot language detection result.
    DetectedLanguage { language_code: String, confidence: f32 },
    /// A finalized, deduplicated sentence and its translation.
    Translation { text: String, translation: String },
    /// Session-scoped error report.
    Error { message: String },
}

impl ServerEvent {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Decodes a raw audio payload into f32 samples.
///
/// The payload is little-endian IEEE-754 f32, mono, at the session's fixed
/// sample rate. Malformed payloads are a [`LivecapError::Decode`]; the
/// session survives them.
pub fn decode_pcm(data: &[u8]) -> Result<Vec<f32>> {
    if data.len() % 4 != 0 {
        return Err(LivecapError::Decode {
            message: format!("payload length {} is not a multiple of 4", data.len()),
        });
    }

    Ok(data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Encodes f32 samples as a little-endian payload (client/test helper).
pub fn encode_pcm(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Pluggable server-to-client event output.
///
/// Pairs with `ClientEvent` handling for input; the transport implements
/// this to deliver emissions to the right connection. Emission must not
/// block: implementations queue and return.
pub trait EventSink: Send + Sync {
    /// Delivers one event to one session's client.
    fn emit(&self, session_id: &str, event: ServerEvent);
}

/// Sink that drops every event (detached sessions, benchmarks).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _session_id: &str, _event: ServerEvent) {}
}

/// Sink that collects events in memory for test assertions.
#[derive(Debug, Default)]
pub struct CollectorSink {
    events: Mutex<Vec<(String, ServerEvent)>>,
}

impl CollectorSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected (session, event) pairs, in emission order.
    pub fn events(&self) -> Vec<(String, ServerEvent)> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Collected events of one session.
    pub fn session_events(&self, session_id: &str) -> Vec<ServerEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(id, _)| id == session_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Collected `translation` events of one session.
    pub fn translations(&self, session_id: &str) -> Vec<(String, String)> {
        self.session_events(session_id)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::Translation { text, translation } => Some((text, translation)),
                _ => None,
            })
            .collect()
    }

    /// Collected `partial_transcription` texts of one session.
    pub fn partials(&self, session_id: &str) -> Vec<String> {
        self.session_events(session_id)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::PartialTranscription { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, session_id: &str, event: ServerEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((session_id.to_string(), event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ClientEvent tests

    #[test]
    fn test_client_event_json_roundtrip() {
        let events = vec![
            ClientEvent::Connect,
            ClientEvent::Disconnect,
            ClientEvent::StartRecording,
            ClientEvent::ChunkNumber { chunk: 17 },
            ClientEvent::AudioChunk {
                data: vec![0, 0, 128, 63],
            },
            ClientEvent::ForceProcess,
            ClientEvent::StopRecording,
        ];

        for event in events {
            let json = event.to_json().expect("should serialize");
            let deserialized = ClientEvent::from_json(&json).expect("should deserialize");
            assert_eq!(event, deserialized, "roundtrip failed for {:?}", event);
        }
    }

    #[test]
    fn test_client_event_json_format_is_snake_case() {
        let json = ClientEvent::StartRecording.to_json().unwrap();
        assert_eq!(json, r#"{"type":"start_recording"}"#);

        let json = ClientEvent::ForceProcess.to_json().unwrap();
        assert_eq!(json, r#"{"type":"force_process"}"#);
    }

    #[test]
    fn test_language_config_wire_names_are_camel_case() {
        let event = ClientEvent::UpdateLanguageConfig(LanguageConfigUpdate {
            source_language: Some("auto".to_string()),
            target_language: Some("kor_Hang".to_string()),
            auto_detect: Some(true),
        });
        let json = event.to_json().unwrap();
        assert!(json.contains("\"sourceLanguage\":\"auto\""), "got {}", json);
        assert!(json.contains("\"targetLanguage\":\"kor_Hang\""));
        assert!(json.contains("\"autoDetect\":true"));
    }

    #[test]
    fn test_language_config_partial_update() {
        let json = r#"{"type":"update_language_config","targetLanguage":"jpn_Jpan"}"#;
        let event = ClientEvent::from_json(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::UpdateLanguageConfig(LanguageConfigUpdate {
                source_language: None,
                target_language: Some("jpn_Jpan".to_string()),
                auto_detect: None,
            })
        );
    }

    #[test]
    fn test_invalid_json_returns_error() {
        assert!(ClientEvent::from_json(r#"{"type":"unknown_event"}"#).is_err());
        assert!(ClientEvent::from_json(r#"{"no":"type"}"#).is_err());
        assert!(ClientEvent::from_json("not json at all").is_err());
    }

    // ServerEvent tests

    #[test]
    fn test_server_event_json_roundtrip() {
        let events = vec![
            ServerEvent::Logger {
                message: "server: Client connected".to_string(),
            },
            ServerEvent::PartialTranscription {
                text: "hello how".to_string(),
                continuous: true,
            },
            ServerEvent::DetectedLanguage {
                language_code: "kor_Hang".to_string(),
                confidence: 0.92,
            },
            ServerEvent::Translation {
                text: "hello".to_string(),
                translation: "안녕하세요".to_string(),
            },
            ServerEvent::Error {
                message: "bad payload".to_string(),
            },
        ];

        for event in events {
            let json = event.to_json().expect("should serialize");
            let deserialized = ServerEvent::from_json(&json).expect("should deserialize");
            assert_eq!(event, deserialized, "roundtrip failed for {:?}", event);
        }
    }

    #[test]
    fn test_server_event_json_format() {
        let json = ServerEvent::Translation {
            text: "hi".to_string(),
            translation: "안녕".to_string(),
        }
        .to_json()
        .unwrap();
        assert!(json.contains(r#""type":"translation""#));
        assert!(json.contains(r#""text":"hi""#));
    }

    // PCM decode tests

    #[test]
    fn test_decode_pcm_roundtrip() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0];
        let decoded = decode_pcm(&encode_pcm(&samples)).unwrap();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_pcm_empty() {
        assert_eq!(decode_pcm(&[]).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn test_decode_pcm_misaligned_payload() {
        let result = decode_pcm(&[0, 1, 2]);
        assert!(matches!(result, Err(LivecapError::Decode { .. })));
    }

    #[test]
    fn test_decode_pcm_little_endian() {
        // 1.0f32 is 00 00 80 3f little-endian.
        let decoded = decode_pcm(&[0x00, 0x00, 0x80, 0x3f]).unwrap();
        assert_eq!(decoded, vec![1.0]);
    }

    // Sink tests

    #[test]
    fn test_collector_sink_filters_by_session() {
        let sink = CollectorSink::new();
        sink.emit(
            "a",
            ServerEvent::Logger {
                message: "one".to_string(),
            },
        );
        sink.emit(
            "b",
            ServerEvent::Logger {
                message: "two".to_string(),
            },
        );

        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.session_events("a").len(), 1);
        assert_eq!(sink.session_events("b").len(), 1);
    }

    #[test]
    fn test_collector_sink_translations_helper() {
        let sink = CollectorSink::new();
        sink.emit(
            "a",
            ServerEvent::Translation {
                text: "hello".to_string(),
                translation: "안녕".to_string(),
            },
        );
        sink.emit(
            "a",
            ServerEvent::Logger {
                message: "noise".to_string(),
            },
        );

        let translations = sink.translations("a");
        assert_eq!(translations, vec![("hello".to_string(), "안녕".to_string())]);
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let sink = NullSink;
        sink.emit(
            "a",
            ServerEvent::Error {
                message: "dropped".to_string(),
            },
        );
    }
}
