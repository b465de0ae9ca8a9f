//! Error types for shiftswap
//!
//! Each error type has a corresponding error code for programmatic handling.
//! Clients branch on the code, never on the message text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for shiftswap operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Main error type for all shiftswap operations
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Malformed or missing input (bad time strings, empty reason, ...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No authenticated identity on the call
    #[error("Authentication required")]
    Unauthorized,

    /// Identity present but lacking the required role or ownership
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced shift, request or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or integrity conflict (duplicate active request, blocked delete)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Substitution transition attempted from a state that does not allow it
    #[error("Cannot {action} a request in status {status}")]
    InvalidState { action: String, status: String },

    /// Final approval attempted before any covering worker accepted
    #[error("No covering worker has accepted this request")]
    MissingCoveringWorker,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Backing store failure (lock poisoned, snapshot unreadable, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid JSON in a persisted file
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            SchedulerError::Validation(_) => "VALIDATION_ERROR",
            SchedulerError::Unauthorized => "UNAUTHORIZED",
            SchedulerError::Forbidden(_) => "FORBIDDEN",
            SchedulerError::NotFound(_) => "NOT_FOUND",
            SchedulerError::Conflict(_) => "CONFLICT",
            SchedulerError::InvalidState { .. } => "INVALID_STATE",
            SchedulerError::MissingCoveringWorker => "MISSING_COVERING_WORKER",
            SchedulerError::ConfigError(_) => "CONFIG_ERROR",
            SchedulerError::FileNotFound(_)
            | SchedulerError::Storage(_)
            | SchedulerError::InvalidJson(_)
            | SchedulerError::Io(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Guard violations (`InvalidState`, `MissingCoveringWorker`) share 409
    /// with `Conflict`; the code tells them apart.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SchedulerError::Validation(_) => StatusCode::BAD_REQUEST,
            SchedulerError::Unauthorized => StatusCode::UNAUTHORIZED,
            SchedulerError::Forbidden(_) => StatusCode::FORBIDDEN,
            SchedulerError::NotFound(_) => StatusCode::NOT_FOUND,
            SchedulerError::Conflict(_)
            | SchedulerError::InvalidState { .. }
            | SchedulerError::MissingCoveringWorker => StatusCode::CONFLICT,
            SchedulerError::ConfigError(_)
            | SchedulerError::FileNotFound(_)
            | SchedulerError::Storage(_)
            | SchedulerError::InvalidJson(_)
            | SchedulerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build an `InvalidState` error from an action and the status it was attempted in
    pub fn invalid_state(action: impl ToString, status: impl ToString) -> Self {
        SchedulerError::InvalidState {
            action: action.to_string(),
            status: status.to_string(),
        }
    }

    /// Whether this error is an internal failure rather than a caller mistake
    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Wire shape of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Never expose storage details to callers
        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal error while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Convert an error to an appropriate process exit code
pub fn to_exit_code(_error: &SchedulerError) -> i32 {
    1
}
