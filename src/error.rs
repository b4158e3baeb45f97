use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeReason {
    MissingRequiredField,
    UnknownUniversity,
}

impl std::fmt::Display for NormalizeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeReason::MissingRequiredField => write!(f, "missing-required-field"),
            NormalizeReason::UnknownUniversity => write!(f, "unknown-university"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid course record: {reason} on field '{field}'")]
    Normalization {
        reason: NormalizeReason,
        field: &'static str,
    },

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Adapter unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Failure body for every endpoint: `success` is always false and
/// `error`/`message` are always populated, matching the success envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Normalization { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::AdapterUnavailable(msg) => {
                error!("adapter unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
