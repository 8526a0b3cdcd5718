//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`], which also loads configuration and validates
//! it for the commands that read the translator settings.

pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod gap;
pub mod greet;
pub mod scripts;
pub mod snippet;
pub mod translate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
