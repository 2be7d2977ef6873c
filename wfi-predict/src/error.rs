//! Error types for the prediction services.

use thiserror::Error;
use wfi_core::CoreError;

/// Errors that can occur in prediction operations.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Caller-supplied features failed validation. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A model artifact is missing or malformed. Fatal at startup.
    #[error("Artifact error: {0}")]
    Artifact(String),
}

impl From<PredictError> for CoreError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(msg) => CoreError::Validation(msg),
            PredictError::Artifact(msg) => CoreError::Config(msg),
        }
    }
}

/// A convenience result type for prediction operations.
pub type Result<T> = std::result::Result<T, PredictError>;
