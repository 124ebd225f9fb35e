//! Audio-side session state: window accumulation and voice-activity tracking.

pub mod vad;
pub mod window;

pub use vad::{VadConfig, VadVerdict, VoiceActivity, calculate_rms};
pub use window::{WindowAccumulator, WindowConfig};
