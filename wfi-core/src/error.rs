//! Error types shared across the WFI crates.

use thiserror::Error;

/// Errors produced by core services (tools, LLM calls, answer parsing).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input failed validation. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external LLM backend failed or timed out.
    #[error("LLM service error ({provider}): {message}")]
    Llm {
        /// The LLM provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A requested tool does not exist or rejected its inputs.
    #[error("Tool invocation error ({tool}): {message}")]
    Tool {
        /// The tool that was requested.
        tool: String,
        /// A description of the failure.
        message: String,
    },

    /// The LLM output did not match the expected structure.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CoreError {
    /// Whether a bounded retry with backoff is appropriate for this error.
    ///
    /// Only external-dependency failures are retryable; validation and
    /// configuration errors surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Llm { .. })
    }
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
