use thiserror::Error;

use crate::tracking::TrackingError;

/// Application-level error type.
/// Per-job agent failures and exhausted quotas never surface here; they become
/// application records instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown portal: {0}")]
    UnknownPortal(String),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = AppError::Validation("bad url".to_string());
        assert_eq!(err.to_string(), "Validation error: bad url");
    }

    #[test]
    fn test_unknown_portal_message() {
        let err = AppError::UnknownPortal("https://jobs.example.com".to_string());
        assert_eq!(err.to_string(), "Unknown portal: https://jobs.example.com");
    }
}
