//! Error types for rex operations.
//!
//! [`RexError`] wraps the domain errors of each script and the translator,
//! plus configuration and I/O failures, behind one [`Result`] alias.
//!
//! - Domain modules keep their own error enums ([`GapError`],
//!   [`TranslateError`]) and convert with `?`
//! - `anyhow::Error` (via `RexError::Other`) carries contextual I/O failures

use std::path::PathBuf;
use thiserror::Error;

use crate::gap::GapError;
use crate::translate::TranslateError;

/// Core error type for rex operations.
#[derive(Debug, Error)]
pub enum RexError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The gap finder rejected its input.
    #[error(transparent)]
    Gap(#[from] GapError),

    /// Translation of a source file failed.
    #[error("{file}:{source}")]
    Translate {
        file: String,
        #[source]
        source: TranslateError,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rex operations.
pub type Result<T> = std::result::Result<T, RexError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Position;

    #[test]
    fn config_not_found_displays_path() {
        let err = RexError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = RexError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn config_validation_error_displays_message() {
        let err = RexError::ConfigValidationError {
            message: "indent_width must be between 1 and 8".into(),
        };
        assert!(err.to_string().contains("indent_width"));
    }

    #[test]
    fn gap_error_is_transparent() {
        let err: RexError = GapError::InsufficientInput { len: 1 }.into();
        assert_eq!(
            err.to_string(),
            "Insufficient input: need at least 2 numbers, got 1"
        );
    }

    #[test]
    fn translate_error_is_prefixed_with_file() {
        let err = RexError::Translate {
            file: "main.rb".into(),
            source: TranslateError::syntax(Position::new(2, 4), "expected `end`"),
        };
        assert_eq!(err.to_string(), "main.rb:2:4: syntax error: expected `end`");
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RexError = io_err.into();
        assert!(matches!(err, RexError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(RexError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
