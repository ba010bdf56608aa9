use article_core::error::CoreError;
use article_core::store::StoreError;
use article_core::validation::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and implements [`IntoResponse`]. Validation failures
/// are returned as the `ValidationError` envelope; every other error uses
/// `{ "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `article_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Core(CoreError::Validation(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Core(CoreError::from(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => match core {
                CoreError::Validation(err) => {
                    tracing::debug!(code = %err.code, messages = err.messages.len(), "Request rejected");
                    return (StatusCode::BAD_REQUEST, axum::Json(err)).into_response();
                }
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Conflict { id, expected } => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Article {id} was modified concurrently; it is no longer at revision {expected}"),
                ),
                CoreError::Unavailable(msg) => {
                    tracing::warn!(error = %msg, "Collaborator unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "UNAVAILABLE",
                        "A backing service is unavailable".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
