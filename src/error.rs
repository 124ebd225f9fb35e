//! Error types for livecap.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivecapError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio payload errors
    #[error("Audio decode failed: {message}")]
    Decode { message: String },

    // External engine errors
    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Language detection failed: {message}")]
    Detection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LivecapError>;
