//! Ruby-subset to R translation.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`lexer`] splits the source into [`Token`]s.
//! 2. [`parser`] builds the [`Program`] tree and checks names, arity and
//!    types against a scoped [`SymbolTable`].
//! 3. [`optimize`] removes assignments and functions nothing uses.
//! 4. [`emit`] renders the tree as R.
//!
//! Errors from every stage are [`TranslateError`]s carrying a position.

pub mod ast;
pub mod emit;
pub mod error;
pub mod lexer;
pub mod optimize;
pub mod parser;
pub mod span;
pub mod symbols;
pub mod token;

pub use ast::Program;
pub use emit::EmitOptions;
pub use error::{Result, Stage, TranslateError};
pub use span::Position;
pub use symbols::SymbolTable;
pub use token::{Token, TokenKind};

/// Settings for a translation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Fold constants and remove dead code.
    pub optimize: bool,
    /// Carry comments into the output.
    pub keep_comments: bool,
    /// One level of indentation in the output.
    pub indent: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            keep_comments: true,
            indent: "\t".to_string(),
        }
    }
}

impl TranslateOptions {
    /// Indent with `width` spaces instead of a tab.
    pub fn with_indent_width(mut self, width: Option<usize>) -> Self {
        self.indent = match width {
            Some(width) => " ".repeat(width),
            None => "\t".to_string(),
        };
        self
    }
}

/// Runs the translation pipeline with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    options: TranslateOptions,
}

impl Translator {
    /// Create a translator with the given options.
    pub fn new(options: TranslateOptions) -> Self {
        Self { options }
    }

    /// Options this translator runs with.
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Tokenize `source`.
    pub fn tokens(&self, source: &str) -> Result<Vec<Token>> {
        lexer::tokenize(source)
    }

    /// Tokenize, parse and (if enabled) optimize `source`.
    pub fn parse(&self, source: &str) -> Result<(Program, SymbolTable)> {
        let tokens = self.tokens(source)?;
        let (mut program, mut symbols) = parser::parse(tokens, self.options.optimize)?;
        if self.options.optimize {
            optimize::optimize(&mut program, &mut symbols);
        }
        Ok((program, symbols))
    }

    /// Translate `source` to R.
    pub fn translate(&self, source: &str) -> Result<String> {
        let (program, _) = self.parse(source)?;
        let emit_options = EmitOptions {
            indent: self.options.indent.clone(),
            keep_comments: self.options.keep_comments,
        };
        let code = emit::emit(&program, &emit_options);
        tracing::debug!("Generated {} lines of R", code.lines().count());
        Ok(code)
    }
}

/// Translate `source` to R with the given options.
pub fn translate(source: &str, options: &TranslateOptions) -> Result<String> {
    Translator::new(options.clone()).translate(source)
}
