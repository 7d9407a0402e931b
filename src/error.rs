//! # Error Types
//!
//! This module defines error types used throughout the lekha library.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for lekha operations
#[derive(Debug, Error)]
pub enum LekhaError {
    /// Operator input rejected before persistence or rendering
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown company, invoice, or template id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Document assembly failure (PDF or preview)
    #[error("Render error: {0}")]
    Render(String),

    /// Signature asset failure. Recovered internally via the vector
    /// fallback; surfaces only when a caller bypasses the resolver.
    #[error("Signature error: {0}")]
    Signature(String),

    /// Email dispatch failure
    #[error("Email error: {0}")]
    Email(String),

    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LekhaError {
    /// HTTP status this error maps to on the REST surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LekhaError::Validation(_) => StatusCode::BAD_REQUEST,
            LekhaError::NotFound(_) => StatusCode::NOT_FOUND,
            LekhaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LekhaError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LekhaError::Signature(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LekhaError::Email(_) => StatusCode::BAD_GATEWAY,
            LekhaError::Transport(_) => StatusCode::BAD_GATEWAY,
            LekhaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every handler failure renders as `{"error": {"message": ...}}` so the
/// UI has one shape to show in its notification toast.
impl IntoResponse for LekhaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": { "message": self.to_string() }
        }));
        (status, body).into_response()
    }
}
