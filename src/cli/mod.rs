//! Command-line interface for rex.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, ConfigArgs, GapArgs, SnippetArgs, TranslateArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
