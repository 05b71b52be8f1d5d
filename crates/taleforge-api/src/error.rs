//! Taleforge API — error mapping to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use taleforge_core::error::DomainError;

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
///
/// Configuration and generation errors normally never reach this layer —
/// background execution absorbs them into the job's `failed` state — but
/// they map to server errors if they ever do.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::StoryNotFound(_) => (StatusCode::NOT_FOUND, "story_not_found"),
            DomainError::JobNotFound(_) => (StatusCode::NOT_FOUND, "job_not_found"),
            DomainError::MissingRootNode(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "integrity_error")
            }
            DomainError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            DomainError::Generation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
