//! Typed error taxonomy for the laneboard API.
//!
//! Every service-layer failure is one of these variants; a single
//! `IntoResponse` impl maps them to the uniform response envelope
//! `{"success": false, "error": <kind>, "message": <text>}` with the
//! matching HTTP status code. Nothing below the handler layer touches
//! status codes directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing input fields; raised at the request boundary.
    #[error("{0}")]
    Validation(String),

    /// Domain-rule violation: lane-not-in-board, lane-has-tasks-on-delete,
    /// WIP-limit-exceeded-on-move.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks the required workspace/board role.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate membership or unique-key collision.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Stable error kind name surfaced in the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::BadRequest(_) => "BadRequestError",
            Self::Unauthorized(_) => "UnauthorizedError",
            Self::Forbidden(_) => "ForbiddenError",
            Self::NotFound(_) => "NotFoundError",
            Self::Conflict(_) => "ConflictError",
            Self::Database(_) | Self::Internal(_) => "InternalServerError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        // Storage-layer and unexpected failures are logged with their cause
        // and surfaced to the caller as a generic message.
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "unhandled error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        });
        (self.status(), Json(body)).into_response()
    }
}
