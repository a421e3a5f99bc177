//! Error types for leadrank-store

use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A config patch carried an unusable value
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_invalid_patch_display() {
        let err = StoreError::InvalidPatch("emailWeight is NaN".into());
        assert_eq!(err.to_string(), "Invalid patch: emailWeight is NaN");
    }
}
