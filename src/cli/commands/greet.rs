//! Greet command implementation.

use crate::error::Result;
use crate::greeting;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Prints the greeting demo's three lines.
pub struct GreetCommand;

impl Command for GreetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        for line in greeting::run() {
            ui.message(&line);
        }
        Ok(CommandResult::success())
    }
}
