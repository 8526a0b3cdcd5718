//! Source positions.

use std::fmt;

use serde::Serialize;

/// A location in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in characters (1-indexed).
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first character of a file.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_one_one() {
        assert_eq!(Position::start(), Position::new(1, 1));
        assert_eq!(Position::default(), Position::start());
    }

    #[test]
    fn displays_line_and_column() {
        assert_eq!(Position::new(12, 7).to_string(), "12:7");
    }
}
