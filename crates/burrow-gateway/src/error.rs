use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::{AllocationError, ResolutionError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced to HTTP clients. Store details are logged, never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("short code not found")]
    NotFound,
    #[error("alias already exists: {0}")]
    Conflict(String),
    #[error("service temporarily unavailable")]
    Unavailable,
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Validation(err) => AppError::Validation(err),
            AllocationError::AliasConflict(alias) => AppError::Conflict(alias),
            other => {
                error!(error = %other, "allocation failed");
                AppError::Internal
            }
        }
    }
}

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::TransientStoreFailure { .. } => {
                warn!(error = %err, "resolution unavailable");
                AppError::Unavailable
            }
            ResolutionError::Storage(_) => {
                error!(error = %err, "resolution failed");
                AppError::Internal
            }
        }
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
