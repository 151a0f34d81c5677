//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use labelhub_core::auth::AuthError;
use labelhub_core::datasets::DatasetError;
use labelhub_core::samples::SampleError;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            ),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::CredentialError => {
                AppError::Unauthorized
            }
            AuthError::RecordNotFound => AppError::NotFound("Record not found".into()),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::NotFound(what) => AppError::NotFound(what),
            DatasetError::Validation(msg) => AppError::Validation(msg),
            DatasetError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<SampleError> for AppError {
    fn from(e: SampleError) -> Self {
        match e {
            SampleError::RecordNotFound => AppError::NotFound("Sample not found".into()),
            SampleError::NoSamplesAvailable => AppError::NotFound("No samples available".into()),
            SampleError::InvalidStatus(raw) => {
                AppError::Validation(format!("Invalid status: {raw}"))
            }
            SampleError::DbError(e) => AppError::from(e),
        }
    }
}
