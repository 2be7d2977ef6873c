//! Error types for the `wfi-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The external embedding service failed. Retryable with backoff.
    #[error("Embedding service error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backing vector index cannot be reached. Retryable with backoff.
    #[error("Index unavailable ({backend}): {message}")]
    IndexUnavailable {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error, fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller-supplied argument is out of range. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An error propagated from `wfi-core`.
    #[error(transparent)]
    Core(#[from] wfi_core::CoreError),
}

impl RagError {
    /// Whether a bounded retry with backoff is appropriate for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::Embedding { .. } | RagError::IndexUnavailable { .. })
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
