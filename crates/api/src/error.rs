//! HTTP mapping for board errors.
//!
//! Every failure leaves the service as `{"error": <message>, "code": <CODE>}`.
//! Gate rejections (`FORBIDDEN`) and membership rejections (`ACCESS_DENIED`)
//! share a status but keep distinct codes so clients can tell them apart.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kanban_core::error::CoreError;
use serde_json::json;

const INTERNAL_MESSAGE: &str = "An internal error occurred";
const BUSY_MESSAGE: &str = "The board is busy, please retry";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error that escaped the service layer unclassified.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn into_core(self) -> CoreError {
        match self {
            AppError::Core(err) => err,
            AppError::Database(sqlx::Error::RowNotFound) => {
                CoreError::Missing("Resource not found".to_string())
            }
            AppError::Database(err) => kanban_db::store_error(err),
        }
    }
}

/// Status and machine-readable code for a domain error.
fn classify(err: &CoreError) -> (StatusCode, &'static str) {
    match err {
        CoreError::NotFound { .. } | CoreError::Missing(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        CoreError::AccessDenied(_) => (StatusCode::FORBIDDEN, "ACCESS_DENIED"),
        CoreError::Transient(_) => (StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT"),
        CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.into_core();
        let (status, code) = classify(&err);

        let message = match err {
            CoreError::NotFound { .. } => err.to_string(),
            CoreError::Missing(msg)
            | CoreError::Validation(msg)
            | CoreError::Conflict(msg)
            | CoreError::Unauthorized(msg)
            | CoreError::Forbidden(msg)
            | CoreError::AccessDenied(msg) => msg,
            CoreError::Transient(msg) => {
                tracing::warn!(error = %msg, "Retry budget exhausted");
                BUSY_MESSAGE.to_string()
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
