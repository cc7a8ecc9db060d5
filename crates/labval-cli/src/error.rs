//! Error types for labval-cli.

use std::path::{Path, PathBuf};

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in labval-cli.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// File system error on a known path
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A JSON input file could not be parsed
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Invalid command-line input
    #[error("{0}")]
    Usage(String),

    /// Error from labval-core
    #[error(transparent)]
    Core(#[from] labval_core::Error),

    /// Error from labval-store
    #[error(transparent)]
    Store(#[from] labval_store::Error),

    /// Error from labval-api
    #[error(transparent)]
    Api(#[from] labval_api::Error),

    /// Error from labval-client
    #[error(transparent)]
    Client(#[from] labval_client::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it happened on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a usage error.
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Error::Usage(message.into())
    }
}
