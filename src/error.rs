//! Error types for the routing and prediction engine
//!
//! The engine has a narrow error taxonomy: routing itself never fails, so the
//! only errors surfaced are caller misuse (malformed boundary input, stale
//! history handles) and configuration or serialization failures during setup.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for router operations
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("History handle {handle} is out of range (retained handles: {retained})")]
    IndexOutOfRange { handle: u64, retained: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RouterError {
    /// Create invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create out-of-range error for a history handle
    ///
    /// `oldest..next` is the half-open range of handles still held by the
    /// history buffer at the time of the lookup.
    pub fn index_out_of_range(handle: u64, oldest: Option<u64>, next: u64) -> Self {
        let retained = match oldest {
            Some(oldest) => format!("{oldest}..{next}"),
            None => "none".to_string(),
        };
        Self::IndexOutOfRange { handle, retained }
    }

    /// True when the error is a caller bug rather than a setup failure
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            RouterError::InvalidArgument { .. } | RouterError::IndexOutOfRange { .. }
        )
    }
}

/// Result type for router operations
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_constructor() {
        let error = RouterError::invalid_argument("input must be a string");
        assert!(matches!(error, RouterError::InvalidArgument { .. }));
        assert_eq!(
            error.to_string(),
            "Invalid argument: input must be a string"
        );
        assert!(error.is_misuse());
    }

    #[test]
    fn test_index_out_of_range_reports_retained_window() {
        let error = RouterError::index_out_of_range(3, Some(50), 150);
        assert_eq!(
            error.to_string(),
            "History handle 3 is out of range (retained handles: 50..150)"
        );
        assert!(error.is_misuse());
    }

    #[test]
    fn test_index_out_of_range_on_empty_history() {
        let error = RouterError::index_out_of_range(0, None, 0);
        assert!(error.to_string().contains("retained handles: none"));
    }

    #[test]
    fn test_config_error_is_not_misuse() {
        let error: RouterError = ConfigError::InvalidConfig("bad weights".to_string()).into();
        assert!(!error.is_misuse());
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration: bad weights"
        );
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: RouterError = parse_error.into();
        assert!(matches!(error, RouterError::Serialization(_)));
        assert!(!error.is_misuse());
    }
}
