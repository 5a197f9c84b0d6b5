//! HTTP error type and its mapping from domain errors.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use staffer_tasks::TaskError;
use tracing::{error, warn};

/// Resource does not exist.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Operation not valid in the resource's current state.
pub const CONFLICT: &str = "CONFLICT";
/// Invalid request values.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// Store unreachable or saturated.
pub const UNAVAILABLE: &str = "UNAVAILABLE";
/// Unexpected internal error.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Wire format of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// Error type returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Requested employee or task not found.
    #[error("{0}")]
    NotFound(String),

    /// Task already in progress.
    #[error("{0}")]
    Conflict(String),

    /// Request values failed validation.
    #[error("{0}")]
    Validation(String),

    /// Database unavailable; the request may succeed later.
    #[error("{0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => NOT_FOUND,
            Self::Conflict(_) => CONFLICT,
            Self::Validation(_) => INVALID_PARAMS,
            Self::Unavailable(_) => UNAVAILABLE,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// HTTP status for this variant.
    ///
    /// `Conflict` answers 400 to keep the established `/assign_task` contract.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to the wire-format error body.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        if err.is_unavailable() {
            return Self::Unavailable(err.to_string());
        }
        match err {
            TaskError::NotFound { .. } => Self::NotFound(err.to_string()),
            TaskError::Conflict(message) => Self::Conflict(message),
            TaskError::Validation(message) => Self::Validation(message),
            TaskError::Database(_) | TaskError::Pool(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(message) => error!(%message, "request failed"),
            Self::Unavailable(message) => warn!(%message, "store unavailable"),
            _ => {}
        }
        (self.status(), Json(self.to_error_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(TaskError::task_not_found(3));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), NOT_FOUND);
        assert_eq!(err.to_string(), "Task not found: 3");
    }

    #[test]
    fn conflict_maps_to_400() {
        let err = ApiError::from(TaskError::Conflict("already running".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_error_body().message, "already running");
    }

    #[test]
    fn validation_maps_to_422() {
        let err = ApiError::from(TaskError::Validation("name is required".into()));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), INVALID_PARAMS);
    }

    #[test]
    fn busy_database_maps_to_503() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let err = ApiError::from(TaskError::from(busy));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), UNAVAILABLE);
    }

    #[test]
    fn other_database_errors_are_internal() {
        let err = ApiError::from(TaskError::from(rusqlite::Error::InvalidQuery));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn response_body_has_code_and_message() {
        let resp = ApiError::NotFound("Employee not found: 9".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["code"], "NOT_FOUND");
        assert_eq!(parsed["message"], "Employee not found: 9");
    }
}
