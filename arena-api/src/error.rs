use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use arena_booking::BookingError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InvalidStateError(String),
    NotImplementedError(String),
    ExternalServiceError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidStateError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotImplementedError(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Upstream service failed".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

// Repository traits surface boxed errors; those are always internal.
impl From<Box<dyn std::error::Error + Send + Sync>> for AppError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Anyhow(anyhow::anyhow!(err.to_string()))
    }
}

/// Maps engine failures onto the HTTP taxonomy. Explicit because the
/// blanket anyhow conversion above would otherwise flatten everything
/// to 500.
pub fn engine_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::NotFound(msg) => AppError::NotFoundError(msg),
        BookingError::Conflict(msg) => AppError::ConflictError(msg),
        BookingError::InvalidState(msg) => AppError::InvalidStateError(msg),
        BookingError::Unsupported(msg) => AppError::NotImplementedError(msg),
        BookingError::External(msg) => AppError::ExternalServiceError(msg),
        BookingError::Storage(msg) => AppError::Anyhow(anyhow::anyhow!(msg)),
    }
}
