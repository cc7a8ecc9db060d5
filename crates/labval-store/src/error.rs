//! Error types for labval-store.

use labval_core::DocumentId;

/// Result type alias for labval-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing documents.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error from labval-core (validation, ids)
    #[error(transparent)]
    Core(#[from] labval_core::Error),

    /// No algorithm with this id
    #[error("Algorithm not found: {id}")]
    AlgorithmNotFound {
        /// Requested id
        id: DocumentId,
    },

    /// No workflow with this id
    #[error("Workflow not found: {id}")]
    WorkflowNotFound {
        /// Requested id
        id: DocumentId,
    },

    /// A workflow definition names an algorithm that does not exist
    #[error("Workflow references unknown algorithm: {id}")]
    UnknownAlgorithm {
        /// The dangling id
        id: DocumentId,
    },

    /// The storage engine failed
    #[error("Storage backend error: {message}")]
    Backend {
        /// Engine error message
        message: String,
    },

    /// The store configuration is unusable
    #[error("Storage configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a backend error.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::Backend {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Core(e) => e.is_client_error(),
            Error::UnknownAlgorithm { .. } => true,
            _ => false,
        }
    }

    /// Returns whether the error is a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::AlgorithmNotFound { .. } | Error::WorkflowNotFound { .. }
        )
    }
}

impl From<redb::Error> for Error {
    fn from(e: redb::Error) -> Self {
        Error::backend(e.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::backend(format!("storage task failed: {e}"))
    }
}
