//! rex - three small example scripts and the Ruby-subset to R translator
//! they came from.
//!
//! # Modules
//!
//! - [`gap`] - Missing-term detection for integer sequences
//! - [`greeting`] - The greeting demo
//! - [`snippet`] - The preserved R snippet and a port of its constructs
//! - [`translate`] - Lexer, parser, optimizer and R emitter
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use rex::translate::{translate, TranslateOptions};
//!
//! let r = translate("x = 10 / 4\nputs(x)\n", &TranslateOptions::default()).unwrap();
//! assert_eq!(r, "x <- 2\nprint(x)\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gap;
pub mod greeting;
pub mod snippet;
pub mod translate;
pub mod ui;

pub use error::{Result, RexError};
