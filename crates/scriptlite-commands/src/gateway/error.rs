//! Error responses for the HTTP gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scriptlite_core::outcome::{Outcome, OutcomeKind};
use scriptlite_core::script::ScriptError;
use thiserror::Error;

use crate::runner::RunError;
use crate::store::SaveError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A tagged outcome; the tag picks the status code.
    #[error("{}", .0.message)]
    Outcome(Outcome),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<ScriptError> for ApiError {
    fn from(e: ScriptError) -> Self {
        match e.outcome_kind() {
            Some(kind) => ApiError::Outcome(Outcome::new(kind, e.to_string())),
            None => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(e: SaveError) -> Self {
        match e.outcome() {
            Some(outcome) => ApiError::Outcome(outcome),
            None => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RunError> for ApiError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Script(e) => e.into(),
            RunError::Tool(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Outcome(outcome) => (
                StatusCode::from_u16(outcome.status.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                serde_json::json!({ "status": outcome.status, "message": outcome.message }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "status": "bad_request", "message": msg }),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "status": "internal_error", "message": msg }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Status code for an outcome that is not an error (success, warning, conflict).
pub fn outcome_status(kind: OutcomeKind) -> StatusCode {
    StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
