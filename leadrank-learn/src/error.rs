//! Error types for leadrank-learn
//!
//! Insufficient feedback is not an error: the learning operations return
//! `None` for that. These variants cover configuration and input decoding.

use thiserror::Error;

/// Error type for learner configuration and feedback decoding
#[derive(Debug, Error)]
pub enum LearnError {
    /// A configuration value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration TOML could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Feedback JSON could not be decoded
    #[error("Malformed feedback: {0}")]
    Feedback(#[from] serde_json::Error),
}

/// Result type alias for learner operations
pub type Result<T> = std::result::Result<T, LearnError>;
