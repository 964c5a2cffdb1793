//! Error types for the analytics engine.
//!
//! Most malformed or sparse input is recovered locally (see the transform
//! and validation modules). Only conditions where no usable result can be
//! produced surface as an [`EngineError`].

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during analytics operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Every candidate model failed on every iteration.
    #[error("no valid model: every candidate failed to produce a finite score")]
    NoValidModel,

    /// The caller cancelled a long-running validation.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// The analytics service was used outside of `start()`/`stop()`.
    #[error("analytics service is not running")]
    ServiceNotRunning,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    Computation(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = EngineError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = EngineError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = EngineError::InvalidParameter("window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: window must be positive"
        );

        let err = EngineError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");

        assert_eq!(EngineError::Cancelled.to_string(), "operation cancelled");
        assert_eq!(
            EngineError::ServiceNotRunning.to_string(),
            "analytics service is not running"
        );
    }

    #[test]
    fn json_errors_become_config_errors() {
        let err: EngineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = EngineError::NoValidModel;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
