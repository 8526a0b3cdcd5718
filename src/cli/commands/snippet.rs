//! Snippet command implementation.
//!
//! Prints the preserved R snippet, its Ruby source, or the output of the
//! ported constructs.

use crate::cli::args::SnippetArgs;
use crate::error::Result;
use crate::snippet;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The snippet command implementation.
pub struct SnippetCommand {
    args: SnippetArgs,
}

impl SnippetCommand {
    /// Create a new snippet command.
    pub fn new(args: SnippetArgs) -> Self {
        Self { args }
    }
}

impl Command for SnippetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.run {
            for line in snippet::run() {
                ui.message(&line);
            }
        } else if self.args.source {
            ui.message(snippet::RUBY_SOURCE.trim_end_matches('\n'));
        } else {
            ui.message(snippet::R_CODE.trim_end_matches('\n'));
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn prints_r_code_by_default() {
        let mut ui = MockUI::new();
        SnippetCommand::new(SnippetArgs::default())
            .execute(&mut ui)
            .unwrap();
        assert_eq!(ui.messages().len(), 1);
        assert!(ui.has_message("print_name <- function(n) {"));
    }

    #[test]
    fn source_prints_ruby() {
        let mut ui = MockUI::new();
        let args = SnippetArgs {
            source: true,
            ..Default::default()
        };
        SnippetCommand::new(args).execute(&mut ui).unwrap();
        assert!(ui.has_message("until j == 0"));
    }

    #[test]
    fn run_prints_port_output() {
        let mut ui = MockUI::new();
        let args = SnippetArgs {
            run: true,
            ..Default::default()
        };
        SnippetCommand::new(args).execute(&mut ui).unwrap();
        assert_eq!(ui.messages(), snippet::run().as_slice());
        assert_eq!(ui.messages()[0], "John is an adult");
    }
}
