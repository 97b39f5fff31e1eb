use thiserror::Error;

/// Unified error type for release-note scanning operations
#[derive(Error, Debug)]
pub enum RelnotesError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Reference not found: {0}")]
    Reference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("History scan failed: {0}")]
    Scan(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-relnotes
pub type Result<T> = std::result::Result<T, RelnotesError>;

impl RelnotesError {
    /// Create a reference error with context
    pub fn reference(msg: impl Into<String>) -> Self {
        RelnotesError::Reference(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RelnotesError::Config(msg.into())
    }

    /// Create a scan error with context
    pub fn scan(msg: impl Into<String>) -> Self {
        RelnotesError::Scan(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelnotesError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelnotesError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(RelnotesError::reference("stable/1.0")
            .to_string()
            .contains("Reference"));
        assert!(RelnotesError::scan("test").to_string().contains("scan"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (RelnotesError::reference("x"), "Reference not found"),
            (RelnotesError::config("x"), "Configuration error"),
            (RelnotesError::scan("x"), "History scan failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
