//! Error types for labval-api.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result type alias for API handlers.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the HTTP API.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error from labval-core
    #[error(transparent)]
    Core(#[from] labval_core::Error),

    /// Error from labval-store
    #[error(transparent)]
    Store(#[from] labval_store::Error),

    /// Error from labval-workflows
    #[error(transparent)]
    Execution(#[from] labval_workflows::Error),

    /// Malformed request body or query string
    #[error("{message}")]
    BadRequest {
        /// What was wrong
        message: String,
    },

    /// Unknown resource named in the path
    #[error("{message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Failed to bind or serve
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        let (client, not_found) = match self {
            Error::Core(e) => (e.is_client_error(), false),
            Error::Store(e) => (e.is_client_error(), e.is_not_found()),
            Error::Execution(e) => (e.is_client_error(), e.is_not_found()),
            Error::BadRequest { .. } => (true, false),
            Error::NotFound { .. } => (false, true),
            Error::Io(_) => (false, false),
        };
        if not_found {
            StatusCode::NOT_FOUND
        } else if client {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
