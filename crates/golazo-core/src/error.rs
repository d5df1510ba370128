use thiserror::Error;

/// Top-level error type for the Golazo workspace.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for GolazoError` so that the `?` operator works
/// across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GolazoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for GolazoError {
    fn from(err: toml::de::Error) -> Self {
        GolazoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GolazoError {
    fn from(err: toml::ser::Error) -> Self {
        GolazoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GolazoError {
    fn from(err: serde_json::Error) -> Self {
        GolazoError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Golazo operations.
pub type Result<T> = std::result::Result<T, GolazoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GolazoError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(GolazoError, &str)> = vec![
            (
                GolazoError::Embedding("model crashed".to_string()),
                "Embedding error: model crashed",
            ),
            (
                GolazoError::Engine("connection refused".to_string()),
                "Engine error: connection refused",
            ),
            (
                GolazoError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                GolazoError::Persistence("row count mismatch".to_string()),
                "Persistence error: row count mismatch",
            ),
            (
                GolazoError::DimensionMismatch {
                    expected: 384,
                    actual: 3,
                },
                "Dimension mismatch: expected 384, got 3",
            ),
            (
                GolazoError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GolazoError = io_err.into();
        assert!(matches!(err, GolazoError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let golazo_err: GolazoError = err.unwrap_err().into();
        assert!(matches!(golazo_err, GolazoError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let golazo_err: GolazoError = err.unwrap_err().into();
        assert!(matches!(golazo_err, GolazoError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(format!("value {}", value))
        }

        assert_eq!(inner().unwrap(), "value 42");
    }
}
