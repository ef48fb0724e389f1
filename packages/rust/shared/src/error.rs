//! Error types for Monotone.
//!
//! Library crates use [`MonotoneError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Monotone operations.
#[derive(Debug, thiserror::Error)]
pub enum MonotoneError {
    /// No content exists for the requested identifier.
    ///
    /// Expected and frequent (stale or malformed routes); not a defect.
    #[error("no content for tutorial '{id}'")]
    NotFound { id: String },

    /// Content could not be retrieved for a reason unrelated to existence
    /// (I/O failure, HTTP error, timeout).
    #[error("content unavailable: {0}")]
    Unavailable(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Index or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate ids, invalid values, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MonotoneError>;

impl MonotoneError {
    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an unavailable error from any displayable message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means "no such content" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MonotoneError::config("bad source");
        assert_eq!(err.to_string(), "config error: bad source");

        let err = MonotoneError::not_found("999");
        assert_eq!(err.to_string(), "no content for tutorial '999'");

        let err = MonotoneError::unavailable("timed out after 5000ms");
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn not_found_is_classified() {
        assert!(MonotoneError::not_found("1").is_not_found());
        assert!(!MonotoneError::unavailable("disk on fire").is_not_found());
        assert!(!MonotoneError::validation("duplicate id").is_not_found());
    }
}
