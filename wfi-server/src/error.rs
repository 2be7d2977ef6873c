//! Error-to-status mapping for the HTTP layer.
//!
//! Caller mistakes map to 400, missing services to 503, upstream failures
//! (embedding backend, vector index, LLM) to 502, and everything else to
//! 500. Tool and parse failures never reach this module; the agent folds
//! them into a degraded 200.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use wfi_core::CoreError;
use wfi_predict::PredictError;
use wfi_rag::RagError;

use crate::schemas::ErrorBody;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 503 for a prediction service whose artifact was not configured.
    pub fn unavailable(service: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: format!("{service} service is not configured"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = match &err {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::Llm { .. } => StatusCode::BAD_GATEWAY,
            CoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoreError::Tool { .. } | CoreError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        let status = match &err {
            RagError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RagError::Embedding { .. } | RagError::IndexUnavailable { .. } => {
                StatusCode::BAD_GATEWAY
            }
            RagError::Config(_) | RagError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RagError::Core(core) => return Self::from_core_ref(core, err.to_string()),
        };
        Self { status, message: err.to_string() }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        let status = match &err {
            PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl ApiError {
    fn from_core_ref(err: &CoreError, message: String) -> Self {
        let status = match err {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::Llm { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(PredictError::Validation("'age' is missing".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let err = ApiError::from(RagError::Embedding {
            provider: "openai".into(),
            message: "timeout".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err = ApiError::from(CoreError::Llm { provider: "openai".into(), message: "503".into() });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_argument_maps_to_bad_request() {
        let err = ApiError::from(RagError::InvalidArgument("k must be positive".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
