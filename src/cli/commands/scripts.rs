//! The default command: run the three scripts in order.

use crate::cli::args::{GapArgs, SnippetArgs};
use crate::config::RexConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::gap::GapCommand;
use super::greet::GreetCommand;
use super::snippet::SnippetCommand;

/// Runs the gap finder, the greeting demo and the snippet port.
pub struct ScriptsCommand {
    sequence: Vec<i64>,
}

impl ScriptsCommand {
    /// Use the configured `gap.sequence` for the gap finder.
    pub fn new(config: &RexConfig) -> Self {
        Self {
            sequence: config.gap.sequence.clone(),
        }
    }
}

impl Command for ScriptsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.header("gap");
        GapCommand::new(&self.sequence, GapArgs::default()).execute(ui)?;

        ui.header("greet");
        GreetCommand.execute(ui)?;

        ui.header("snippet");
        let run = SnippetArgs {
            run: true,
            ..Default::default()
        };
        SnippetCommand::new(run).execute(ui)?;

        Ok(CommandResult::success())
    }
}
