//! Config command implementation.
//!
//! The `rex config` command shows the effective configuration.

use std::path::PathBuf;

use crate::cli::args::ConfigArgs;
use crate::config::RexConfig;
use crate::error::{Result, RexError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    config: RexConfig,
    sources: Vec<PathBuf>,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command for an already loaded configuration.
    pub fn new(config: RexConfig, sources: Vec<PathBuf>, args: ConfigArgs) -> Self {
        Self {
            config,
            sources,
            args,
        }
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.sources.is_empty() {
            ui.detail("# no config files found, showing defaults");
        }
        for path in &self.sources {
            ui.detail(&format!("# {}", path.display()));
        }

        if self.args.json {
            let json = serde_json::to_string_pretty(&self.config)
                .map_err(|e| RexError::Other(e.into()))?;
            ui.message(&json);
        } else {
            let yaml =
                serde_yaml::to_string(&self.config).map_err(|e| RexError::Other(e.into()))?;
            ui.message(yaml.trim_end_matches('\n'));
        }

        Ok(CommandResult::success())
    }
}
