//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ProgrammeError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Internal server error
    Internal(String),
    /// Error raised while loading or rendering the programme
    Programme(ProgrammeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Programme(e) => {
                let msg = e.to_string();
                if e.is_consistency_fault() {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        ApiError::new("SCHEDULE_CONFLICT", "The schedule cannot be laid out")
                            .with_details(msg),
                    )
                } else {
                    match e {
                        ProgrammeError::Feed(_)
                        | ProgrammeError::Parse(_)
                        | ProgrammeError::Json(_) => (
                            StatusCode::BAD_GATEWAY,
                            ApiError::new("FEED_ERROR", "The schedule feed is unavailable")
                                .with_details(msg),
                        ),
                        ProgrammeError::UnknownDate(_) => {
                            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                        }
                        _ => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ApiError::new("RENDER_ERROR", msg),
                        ),
                    }
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<ProgrammeError> for AppError {
    fn from(err: ProgrammeError) -> Self {
        AppError::Programme(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
