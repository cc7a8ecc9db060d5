//! Error types for labval-workflows.

use std::time::Duration;

use crate::ids::ExecutionId;

/// Result type alias for execution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running executions.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error from labval-core
    #[error(transparent)]
    Core(#[from] labval_core::Error),

    /// Error from labval-store (missing algorithm or workflow, backend failure)
    #[error(transparent)]
    Store(#[from] labval_store::Error),

    /// No execution with this id is retained
    #[error("Execution not found: {id}")]
    ExecutionNotFound {
        /// Requested id
        id: ExecutionId,
    },

    /// The execution stopped with an error
    #[error("Execution {id} failed: {reason}")]
    ExecutionFailed {
        /// Execution id
        id: ExecutionId,
        /// Failure reason
        reason: String,
    },

    /// Invalid execution settings
    #[error("Invalid execution config: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// The execution did not finish in time
    #[error("Execution {id} not finished after {waited:?}")]
    Timeout {
        /// Execution id
        id: ExecutionId,
        /// How long the caller waited
        waited: Duration,
    },
}

impl Error {
    /// Creates a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Core(e) => e.is_client_error(),
            Error::Store(e) => e.is_client_error(),
            _ => false,
        }
    }

    /// Returns whether the error is a missing document or execution.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(e) => e.is_not_found(),
            Error::ExecutionNotFound { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use labval_core::DocumentId;

    #[test]
    fn test_store_not_found_passes_through() {
        let id = DocumentId::new();
        let err: Error = labval_store::Error::AlgorithmNotFound { id }.into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("Algorithm not found: {id}"));
    }

    #[test]
    fn test_execution_not_found() {
        let err = Error::ExecutionNotFound {
            id: ExecutionId::new(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_timeout_display() {
        let id = ExecutionId::new();
        let err = Error::Timeout {
            id,
            waited: Duration::from_millis(50),
        };
        assert_eq!(
            err.to_string(),
            format!("Execution {id} not finished after 50ms")
        );
    }

    #[test]
    fn test_config_display() {
        let err = Error::config("pass_probability must be between 0 and 1");
        assert_eq!(
            err.to_string(),
            "Invalid execution config: pass_probability must be between 0 and 1"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_is_client_error() {
        let err: Error = labval_core::Error::validation("bad").into();
        assert!(err.is_client_error());
    }
}
