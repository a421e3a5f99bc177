//! Error types for leadrank-signals

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    /// A custom intent pattern failed to compile
    #[error("invalid pattern for intent '{intent}': {source}")]
    InvalidPattern {
        intent: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, SignalError>;
