//! Error types for labval core library.

/// Errors raised by the domain model, catalog and rule interpreter.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A definition failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Path of the offending field (e.g. `parameters[0].name`)
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A document id was not 24 hexadecimal characters
    #[error("Invalid document id: '{value}'")]
    InvalidId {
        /// The rejected input
        value: String,
    },

    /// No algorithm template with this key
    #[error("Template not found: {key}")]
    TemplateNotFound {
        /// Requested template key
        key: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for labval core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether the error was caused by the caller's input.
    ///
    /// Client errors are reported as `400 Bad Request` by the API.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Validation { .. } => true,
            Error::InvalidId { .. } => true,
            Error::TemplateNotFound { .. } => true,
            Error::Serialization(_) => false,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field path.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Prefixes the field path of a validation error.
    ///
    /// Used when a nested value is validated on its own and the caller
    /// knows where it lives in the enclosing document.
    pub fn within(self, prefix: &str) -> Self {
        match self {
            Error::Validation { field, message } => Error::Validation {
                field: Some(match field {
                    Some(field) => format!("{prefix}.{field}"),
                    None => prefix.to_string(),
                }),
                message,
            },
            other => other,
        }
    }

    /// Creates an invalid id error.
    pub fn invalid_id<S: Into<String>>(value: S) -> Self {
        Error::InvalidId {
            value: value.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("Please enter an algorithm name");
        assert_eq!(
            err.to_string(),
            "Validation error: Please enter an algorithm name"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_error_with_field() {
        let err = Error::validation_field("name", "must not be empty");
        let Error::Validation { field, message } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field, Some("name".to_string()));
        assert_eq!(message, "must not be empty");
    }

    #[test]
    fn test_within_prefixes_field() {
        let err = Error::validation_field("config", "min exceeds max").within("parameters[1]");
        let Error::Validation { field, .. } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field.as_deref(), Some("parameters[1].config"));
    }

    #[test]
    fn test_within_sets_missing_field() {
        let err = Error::validation("bad").within("subParameters[0]");
        let Error::Validation { field, .. } = err else {
            unreachable!("Expected Validation error variant");
        };
        assert_eq!(field.as_deref(), Some("subParameters[0]"));
    }

    #[test]
    fn test_within_leaves_other_variants() {
        let err = Error::invalid_id("xyz").within("parameters[0]");
        assert!(matches!(err, Error::InvalidId { .. }));
    }

    #[test]
    fn test_invalid_id_display() {
        let err = Error::invalid_id("abc");
        assert_eq!(err.to_string(), "Invalid document id: 'abc'");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_template_not_found() {
        let err = Error::TemplateNotFound {
            key: "saliva".to_string(),
        };
        assert_eq!(err.to_string(), "Template not found: saliva");
    }

    #[test]
    fn test_serde_error_is_not_client_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = serde_err.into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
