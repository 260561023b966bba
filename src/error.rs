//! Engine error taxonomy and its HTTP mapping.
//!
//! Every failure is recovered at the request boundary and reported as a
//! structured `{code, msg}` response; nothing here crashes the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Missing or malformed required fields.
    #[error("{0}")]
    InvalidRequest(String),

    /// Unknown session id, join code or player.
    #[error("{0}")]
    NotFound(String),

    /// Session is not joinable: wrong state without drop-in, or full.
    #[error("{0}")]
    JoinRejected(String),

    /// An engine precondition was not met (e.g. submitting before a round exists).
    #[error("{0}")]
    ActionFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "INVALID_REQUEST",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::JoinRejected(_) => "JOIN_REJECTED",
            EngineError::ActionFailed(_) => "ACTION_FAILED",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::JoinRejected(_) => StatusCode::CONFLICT,
            EngineError::ActionFailed(_) => StatusCode::CONFLICT,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        if matches!(self, EngineError::Internal(_)) {
            tracing::error!("{self}");
        }
        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
