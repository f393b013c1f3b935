//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use taskhub_core::error::{AppError, ErrorKind};

pub type ApiResult<T> = Result<T, ApiError>;

/// An [`AppError`] leaving through the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    pub message: String,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self(AppError::validation(errors.to_string()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match self.0.kind {
            ErrorKind::Authentication => ("UNAUTHENTICATED", self.0.message),
            ErrorKind::Authorization => ("FORBIDDEN", self.0.message),
            ErrorKind::NotFound => ("NOT_FOUND", self.0.message),
            ErrorKind::Validation => ("VALIDATION_ERROR", self.0.message),
            ErrorKind::Conflict => ("CONFLICT", self.0.message),
            kind => {
                tracing::error!(kind = %kind, error = %self.0, "Internal server error");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let body = ApiErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
