//! Engine configuration.
//!
//! TOML-backed tuning for the session engine. Every field has a default
//! drawn from [`crate::defaults`], so a missing file or a partial file is
//! always usable.

use crate::defaults;
use crate::error::LivecapError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioSection,
    pub vad: VadSection,
    pub timing: TimingSection,
    pub language: LanguageSection,
}

/// Audio windowing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSection {
    pub sample_rate: u32,
    /// Recognition window length in milliseconds.
    pub window_ms: u32,
    /// Minimum buffered audio before recognition runs, in milliseconds.
    pub min_window_ms: u32,
    /// Buffer age limit in milliseconds.
    pub max_buffer_age_ms: u64,
    /// Minimum buffered samples for the final pass on stop.
    pub stop_flush_min_samples: usize,
}

/// Voice-activity configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VadSection {
    pub energy_floor: f32,
    pub adaptive_ratio: f32,
    pub history_len: usize,
    pub min_silence_ms: u64,
    pub quiet_skip_ratio: f32,
}

/// Flush and throttle timing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingSection {
    pub min_process_interval_ms: u64,
    pub watchdog_period_ms: u64,
    pub watchdog_min_silence_ms: u64,
    pub watchdog_stale_after_ms: u64,
    pub force_process_interval_ms: u64,
    pub partial_update_throttle_ms: u64,
}

/// Language defaults for new sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageSection {
    pub source: String,
    pub target: String,
    pub auto_detect: bool,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_ms: 5_000,
            min_window_ms: 2_000,
            max_buffer_age_ms: defaults::MAX_BUFFER_AGE.as_millis() as u64,
            stop_flush_min_samples: defaults::STOP_FLUSH_MIN_SAMPLES,
        }
    }
}

impl Default for VadSection {
    fn default() -> Self {
        Self {
            energy_floor: defaults::ENERGY_FLOOR,
            adaptive_ratio: defaults::ADAPTIVE_ENERGY_RATIO,
            history_len: defaults::ENERGY_HISTORY_LEN,
            min_silence_ms: defaults::MIN_SILENCE_FOR_PROCESSING.as_millis() as u64,
            quiet_skip_ratio: defaults::QUIET_SKIP_RATIO,
        }
    }
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            min_process_interval_ms: defaults::MIN_PROCESS_INTERVAL.as_millis() as u64,
            watchdog_period_ms: defaults::WATCHDOG_PERIOD.as_millis() as u64,
            watchdog_min_silence_ms: defaults::WATCHDOG_MIN_SILENCE.as_millis() as u64,
            watchdog_stale_after_ms: defaults::WATCHDOG_STALE_AFTER.as_millis() as u64,
            force_process_interval_ms: defaults::FORCE_PROCESS_INTERVAL.as_millis() as u64,
            partial_update_throttle_ms: defaults::PARTIAL_UPDATE_THROTTLE.as_millis() as u64,
        }
    }
}

impl Default for LanguageSection {
    fn default() -> Self {
        Self {
            source: defaults::DEFAULT_SOURCE_LANGUAGE.to_string(),
            target: defaults::DEFAULT_TARGET_LANGUAGE.to_string(),
            auto_detect: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LIVECAP_SOURCE_LANG → language.source
    /// - LIVECAP_TARGET_LANG → language.target
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(source) = std::env::var("LIVECAP_SOURCE_LANG")
            && !source.is_empty()
        {
            if source == defaults::AUTO_LANGUAGE {
                self.language.auto_detect = true;
            } else {
                self.language.source = source;
                self.language.auto_detect = false;
            }
        }
        if let Ok(target) = std::env::var("LIVECAP_TARGET_LANG")
            && !target.is_empty()
        {
            self.language.target = target;
        }
        self
    }

    /// Checks value ranges that would otherwise fail far from their cause.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.min_window_ms > self.audio.window_ms {
            return Err(LivecapError::ConfigInvalidValue {
                key: "audio.min_window_ms".to_string(),
                message: "must not exceed audio.window_ms".to_string(),
            });
        }
        if self.vad.history_len == 0 {
            return Err(LivecapError::ConfigInvalidValue {
                key: "vad.history_len".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.vad.adaptive_ratio) {
            return Err(LivecapError::ConfigInvalidValue {
                key: "vad.adaptive_ratio".to_string(),
                message: "must be within 0.0..=1.0".to_string(),
            });
        }
        Ok(())
    }

    /// Window size in samples derived from the audio section.
    pub fn window_samples(&self) -> usize {
        (self.audio.sample_rate as u64 * self.audio.window_ms as u64 / 1_000) as usize
    }

    /// Minimum processable buffer size in samples.
    pub fn min_window_samples(&self) -> usize {
        (self.audio.sample_rate as u64 * self.audio.min_window_ms as u64 / 1_000) as usize
    }
}
