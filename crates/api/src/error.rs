use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use nanomerch_core::error::CoreError;
use nanomerch_core::export::ExportError;
use nanomerch_core::session::{GenerationError, GENERATION_FAILED_MESSAGE};

/// Application-level error type for HTTP handlers.
///
/// Wraps the core error types and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `nanomerch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed or rejected generation attempt.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A failed or rejected storyboard export.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Generation(err) if err.is_surfaced() => (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                GENERATION_FAILED_MESSAGE.to_string(),
            ),
            AppError::Generation(GenerationError::Busy) => {
                (StatusCode::CONFLICT, "CONFLICT", self.to_string())
            }
            AppError::Generation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }

            AppError::Export(err) => match err {
                ExportError::Busy => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
                ExportError::Invalid(core) => classify_core_error(core),
                ExportError::Render(msg) => {
                    tracing::error!(error = %msg, "Storyboard export failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "EXPORT_FAILED",
                        "Failed to export storyboard".to_string(),
                    )
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a [`CoreError`] into an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
