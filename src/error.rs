//! Error types for the session engine
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while driving a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bad caller input; nothing was mutated
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A recovery attempt produced no observable change
    #[error("Recovery stalled: {0}")]
    Stall(String),

    /// The configured recovery procedure is missing
    #[error("Recovery unavailable: {0}")]
    RecoveryUnavailable(String),

    /// Every restore source was exhausted below the target level
    #[error("Insufficient resource: {0}")]
    InsufficientResource(String),

    /// The round trip failed or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// A merchant page did not show the expected balance
    #[error("Unknown balance: {0}")]
    UnknownBalance(String),

    /// The abort signal was raised at a boundary
    #[error("Run aborted")]
    Aborted,

    /// A merchant refused the request
    #[error("Request refused: {0}")]
    Rejected(String),

    /// Static data table is malformed
    #[error("Data error: {0}")]
    Data(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Bad extraction pattern in static data
    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = SessionError::Validation("Zero is not a valid quantity.".to_string());
        assert_eq!(err.to_string(), "Invalid request: Zero is not a valid quantity.");
    }

    #[test]
    fn test_stall_error() {
        let err = SessionError::Stall("Auto-recovery script failed to restore HP.".to_string());
        assert_eq!(
            err.to_string(),
            "Recovery stalled: Auto-recovery script failed to restore HP."
        );
    }

    #[test]
    fn test_insufficient_resource_error() {
        let err = SessionError::InsufficientResource("Unable to acquire enough MP!".to_string());
        assert!(err.to_string().contains("Unable to acquire enough MP!"));
    }

    #[test]
    fn test_aborted_error() {
        assert_eq!(SessionError::Aborted.to_string(), "Run aborted");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "script not found");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::Io(_)));
        assert!(err.to_string().contains("script not found"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{ not: a list").unwrap_err();
        let err: SessionError = yaml_err.into();
        assert!(matches!(err, SessionError::Yaml(_)));
    }

    #[test]
    fn test_regex_error_conversion() {
        let re_err = regex::Regex::new("([").unwrap_err();
        let err: SessionError = re_err.into();
        assert!(matches!(err, SessionError::Regex(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i64> {
            Ok(42)
        }

        fn returns_err() -> Result<i64> {
            Err(SessionError::Transport("timed out".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
