//! Error types for focal.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using focal's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reconciliation operations.
///
/// Merge rejections (lower-priority source, invalid candidate value) are
/// not errors; setters drop those silently and return `false`. The
/// variants here cover the conditions that must reach a caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Title synthesis refused because a stronger source owns the title
    #[error("Title locked by stronger source: {0}")]
    TitleLocked(Uuid),

    /// Record has no assigned id but the operation requires persistence
    #[error("Missing record id: {0}")]
    MissingId(&'static str),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record repository operation failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Label lookup/creation failed
    #[error("Label error: {0}")]
    Label(String),

    /// Keyword lookup/creation failed
    #[error("Keyword error: {0}")]
    Keyword(String),

    /// Location resolution failed
    #[error("Location error: {0}")]
    Location(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_title_locked() {
        let id = Uuid::nil();
        let err = Error::TitleLocked(id);
        assert_eq!(
            err.to_string(),
            format!("Title locked by stronger source: {}", id)
        );
    }

    #[test]
    fn test_error_display_missing_id() {
        let err = Error::MissingId("save form");
        assert_eq!(err.to_string(), "Missing record id: save form");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("zero coordinates".to_string());
        assert_eq!(err.to_string(), "Invalid input: zero coordinates");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("cell zz".to_string());
        assert_eq!(err.to_string(), "Not found: cell zz");
    }

    #[test]
    fn test_error_display_repository() {
        let err = Error::Repository("connection reset".to_string());
        assert_eq!(err.to_string(), "Repository error: connection reset");
    }

    #[test]
    fn test_error_display_label() {
        let err = Error::Label("lookup timed out".to_string());
        assert_eq!(err.to_string(), "Label error: lookup timed out");
    }

    #[test]
    fn test_error_display_keyword() {
        let err = Error::Keyword("store unavailable".to_string());
        assert_eq!(err.to_string(), "Keyword error: store unavailable");
    }

    #[test]
    fn test_error_display_location() {
        let err = Error::Location("resolver offline".to_string());
        assert_eq!(err.to_string(), "Location error: resolver offline");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }
}
