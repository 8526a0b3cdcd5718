//! Translation errors.

use std::fmt;

use thiserror::Error;

use super::span::Position;

/// The pipeline stage that rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Invalid characters, strings or numbers.
    Lexical,
    /// Tokens that do not form a valid program.
    Syntax,
    /// A well-formed program that refers to things incorrectly.
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Syntax => "syntax",
            Self::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

/// An error raised while translating source code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {stage} error: {message}")]
pub struct TranslateError {
    /// Stage that produced the error.
    pub stage: Stage,
    /// Where the offending token starts.
    pub position: Position,
    /// Human-readable description.
    pub message: String,
}

impl TranslateError {
    /// Create a lexical error.
    pub fn lexical(position: Position, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Lexical,
            position,
            message: message.into(),
        }
    }

    /// Create a syntax error.
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Syntax,
            position,
            message: message.into(),
        }
    }

    /// Create a semantic error.
    pub fn semantic(position: Position, message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Semantic,
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for translation.
pub type Result<T> = std::result::Result<T, TranslateError>;
