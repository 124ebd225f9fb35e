//! Audio window accumulation.
//!
//! Inbound chunks append to a per-session buffer; once a full recognition
//! window has accumulated it is consumed, keeping the trailing third so the
//! next window overlaps the current one lexically. Overlap is what makes
//! text reconciliation across windows tractable.

use crate::defaults;
use std::time::Instant;

/// Configuration for the window accumulator.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Full recognition window size in samples.
    pub window_samples: usize,
    /// Buffer age after which a content-free session's buffer is dropped.
    pub max_age: std::time::Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_samples: defaults::WINDOW_SAMPLES,
            max_age: defaults::MAX_BUFFER_AGE,
        }
    }
}

/// Per-session sample buffer with overlap-preserving consumption.
#[derive(Debug, Clone)]
pub struct WindowAccumulator {
    config: WindowConfig,
    buffer: Vec<f32>,
    /// When the buffer was last emptied or created.
    reset_time: Instant,
}

impl WindowAccumulator {
    /// Creates an empty accumulator.
    pub fn new(config: WindowConfig, now: Instant) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            reset_time: now,
        }
    }

    /// Appends samples to the buffer.
    pub fn append(&mut self, samples: &[f32]) {
        self.buffer.extend_from_slice(samples);
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns true once a full window has accumulated.
    pub fn ready(&self) -> bool {
        self.buffer.len() >= self.config.window_samples
    }

    /// Takes the next recognition window.
    ///
    /// Returns the first `window_samples` buffered samples (or the whole
    /// buffer if shorter, for the final pass on stop) and consumes 2/3 of a
    /// window, leaving the trailing third in place as overlap for the next
    /// window.
    pub fn take_window(&mut self) -> Vec<f32> {
        let window_len = self.buffer.len().min(self.config.window_samples);
        let window = self.buffer[..window_len].to_vec();

        let consume = (self.config.window_samples * defaults::WINDOW_CONSUME_NUMER
            / defaults::WINDOW_CONSUME_DENOM)
            .min(self.buffer.len());
        self.buffer.drain(..consume);

        window
    }

    /// Returns true once the buffer has outlived its maximum age.
    pub fn is_stale(&self, now: Instant) -> bool {
        now.duration_since(self.reset_time) > self.config.max_age
    }

    /// Drops all buffered audio and restarts the age clock.
    pub fn reset(&mut self, now: Instant) {
        self.buffer.clear();
        self.reset_time = now;
    }
}
