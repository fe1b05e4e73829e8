//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
///
/// Everything except authentication and missing resources answers 500 with
/// the underlying message as-is.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Invalid session ID")]
    InvalidSession,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Service(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "AUTH_REQUIRED"),
            ApiError::InvalidSession => (StatusCode::UNAUTHORIZED, "INVALID_SESSION"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "VALIDATION"),
            ApiError::Service(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVICE"),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSession => ApiError::InvalidSession,
            AuthError::Service(_) => ApiError::Service(err.to_string()),
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::PatientNotFound => ApiError::NotFound(err.to_string()),
            PipelineError::Validation(message) => ApiError::Validation(message),
            PipelineError::Report(_) => ApiError::Service(err.to_string()),
            PipelineError::Database(e) => e.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
            CoreError::HttpClient(_) => ApiError::Internal(err.to_string()),
        }
    }
}
