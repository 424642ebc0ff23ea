use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::StoreError;
use crate::sweep::SweepError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// A collaborator the request depends on could not be set up.
    #[error("{error}: {details}")]
    SetupFailed { error: String, details: String },
    #[error("Store error: {0}")]
    StoreError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, serde_json::json!({ "error": msg }))
            }
            AppError::SetupFailed { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": error, "details": details }),
            ),
            AppError::StoreError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": format!("Store error: {msg}") }),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MonitorNotFound { .. } => AppError::NotFound(err.to_string()),
            other => AppError::StoreError(other.to_string()),
        }
    }
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Store(e) => AppError::SetupFailed {
                error: "Sweep failed".to_string(),
                details: e.to_string(),
            },
            SweepError::OwnerNotFound(_) | SweepError::MonitorNotFound { .. } => {
                AppError::NotFound(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl AppError {
    /// Maps a failed single-monitor check; store failures keep the store envelope.
    pub fn from_check(err: SweepError) -> Self {
        match err {
            SweepError::Store(e) => AppError::from(e),
            other => AppError::from(other),
        }
    }
}
