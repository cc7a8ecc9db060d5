//! Error types for labval-client.

use std::time::Duration;

use labval_workflows::ExecutionId;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`LabvalClient`](crate::LabvalClient).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport failure or undecodable response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The server's `error` field, or the status reason
        message: String,
    },

    /// The execution stopped with an error
    #[error("Execution {id} failed: {reason}")]
    ExecutionFailed {
        /// Execution id
        id: ExecutionId,
        /// Failure reason reported by the server
        reason: String,
    },

    /// The execution did not finish in time
    #[error("Execution {id} not finished after {waited:?}")]
    Timeout {
        /// Execution id
        id: ExecutionId,
        /// How long the client polled
        waited: Duration,
    },
}

impl Error {
    /// Status code of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for `404 Not Found` answers.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 404,
            message: "Algorithm not found: 65a1f0c2e4b0a1b2c3d4e5f6".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error 404: Algorithm not found: 65a1f0c2e4b0a1b2c3d4e5f6"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_timeout_has_no_status() {
        let err = Error::Timeout {
            id: ExecutionId::new(),
            waited: Duration::from_secs(1),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
