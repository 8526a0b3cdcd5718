//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, ConfigPaths, RexConfig};
use crate::error::Result;
use crate::ui::{OutputMode, UserInterface};

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Returns a [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Exit code to use (0 for success).
    pub exit_code: u8,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            config_path: None,
        }
    }

    /// Load configuration from `path` only, skipping discovery.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Config files that contribute to the effective configuration.
    pub fn config_sources(&self) -> Vec<PathBuf> {
        match &self.config_path {
            Some(path) => vec![path.clone()],
            None => ConfigPaths::discover(&self.project_root)
                .all_existing()
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Load configuration.
    ///
    /// `settings.default_output` applies only when no output flag was given.
    pub fn load_config(&self, ui: &mut dyn UserInterface) -> Result<RexConfig> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;

        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(config.settings.default_output);
        }
        Ok(config)
    }

    /// Load configuration and check the translator settings.
    pub fn load_validated_config(&self, ui: &mut dyn UserInterface) -> Result<RexConfig> {
        let config = self.load_config(ui)?;
        config.validate()?;
        Ok(config)
    }

    /// Pick up `settings.default_output` for commands that read nothing else.
    ///
    /// A broken config file is logged and otherwise ignored.
    fn apply_output_settings(&self, ui: &mut dyn UserInterface) {
        if let Err(e) = self.load_config(ui) {
            tracing::debug!("Ignoring configuration: {}", e);
        }
    }

    /// Dispatch and execute a command.
    ///
    /// Only `translate` and `config` reject invalid translator settings.
    /// `greet` and `snippet` never fail on configuration.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cmd: Box<dyn Command> = match &cli.command {
            Some(Commands::Gap(args)) => {
                let config = self.load_config(ui)?;
                Box::new(super::gap::GapCommand::new(
                    &config.gap.sequence,
                    args.clone(),
                ))
            }
            Some(Commands::Greet) => {
                self.apply_output_settings(ui);
                Box::new(super::greet::GreetCommand)
            }
            Some(Commands::Snippet(args)) => {
                self.apply_output_settings(ui);
                Box::new(super::snippet::SnippetCommand::new(args.clone()))
            }
            Some(Commands::Translate(args)) => {
                let config = self.load_validated_config(ui)?;
                Box::new(super::translate::TranslateCommand::new(
                    &config,
                    args.clone(),
                ))
            }
            Some(Commands::Config(args)) => {
                let config = self.load_validated_config(ui)?;
                Box::new(super::config::ConfigCommand::new(
                    config,
                    self.config_sources(),
                    args.clone(),
                ))
            }
            Some(Commands::Completions(args)) => Box::new(
                super::completions::CompletionsCommand::new(args.clone()),
            ),
            None => {
                let config = self.load_config(ui)?;
                Box::new(super::scripts::ScriptsCommand::new(&config))
            }
        };

        cmd.execute(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RexError;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let rex_dir = temp.path().join(".rex");
        fs::create_dir_all(&rex_dir).unwrap();
        fs::write(rex_dir.join("config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn command_result_success() {
        assert_eq!(CommandResult::success().exit_code, 0);
    }

    #[test]
    fn gap_uses_configured_sequence() {
        let temp = project("gap:\n  sequence: [1, 4, 10]\n");
        let cli = Cli::parse_from(["rex", "gap"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.messages(), ["7"]);
    }

    #[test]
    fn default_output_applies_without_flags() {
        let temp = project("settings:\n  default_output: quiet\n");
        let cli = Cli::parse_from(["rex", "greet"]);
        let mut ui = MockUI::new();

        CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn explicit_output_mode_wins_over_config() {
        let temp = project("settings:\n  default_output: quiet\n");
        let cli = Cli::parse_from(["rex", "greet"]);
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn invalid_config_is_rejected_by_translate() {
        let temp = project("translate:\n  indent_width: 12\n");
        let source = temp.path().join("main.rb");
        fs::write(&source, "puts(1)\n").unwrap();
        let cli = Cli::parse_from(["rex", "translate", source.to_str().unwrap()]);
        let mut ui = MockUI::new();

        let err = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap_err();

        assert!(matches!(err, RexError::ConfigValidationError { .. }));
    }

    #[test]
    fn greet_and_snippet_ignore_invalid_config() {
        let temp = project("translate:\n  indent_width: 12\n");
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());

        let mut ui = MockUI::new();
        let result = dispatcher
            .dispatch(&Cli::parse_from(["rex", "greet"]), &mut ui)
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(ui.has_message("Hello, world!"));

        let mut ui = MockUI::new();
        let result = dispatcher
            .dispatch(&Cli::parse_from(["rex", "snippet", "--run"]), &mut ui)
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(ui.has_message("Hello, John!"));
    }

    #[test]
    fn unparsable_config_does_not_break_greet() {
        let temp = project("settings: [unclosed\n");
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&Cli::parse_from(["rex", "greet"]), &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.output_mode(), OutputMode::Normal);
    }

    #[test]
    fn config_override_replaces_discovery() {
        let temp = project("gap:\n  sequence: [1, 4, 10]\n");
        let other = temp.path().join("other.yml");
        fs::write(&other, "gap:\n  sequence: [3, 6, 12]\n").unwrap();

        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf()).with_config(Some(other.clone()));
        assert_eq!(dispatcher.config_sources(), vec![other]);

        let cli = Cli::parse_from(["rex", "gap"]);
        let mut ui = MockUI::new();
        dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert_eq!(ui.messages(), ["9"]);
    }

    #[test]
    fn no_subcommand_runs_every_script() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::parse_from(["rex"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(temp.path().to_path_buf())
            .dispatch(&cli, &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.messages()[0], "8");
        assert!(ui.has_message("Hello, world!"));
        assert!(ui.has_message("Hello, John!"));
        assert_eq!(ui.headers(), ["gap", "greet", "snippet"]);
    }
}
