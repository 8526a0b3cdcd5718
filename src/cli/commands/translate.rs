//! Translate command implementation.
//!
//! The `rex translate` command reads a Ruby-subset program from a file or
//! stdin and writes R, a token dump or a JSON syntax tree.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::cli::args::TranslateArgs;
use crate::config::RexConfig;
use crate::error::{Result, RexError};
use crate::translate::{TranslateError, TranslateOptions, Translator};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Name used in error messages for standard input.
const STDIN_NAME: &str = "<stdin>";

/// The translate command implementation.
pub struct TranslateCommand {
    args: TranslateArgs,
    options: TranslateOptions,
}

impl TranslateCommand {
    /// Create a translate command. Flags override the configured settings.
    pub fn new(config: &RexConfig, args: TranslateArgs) -> Self {
        let mut options = config.translate_options();
        if args.no_optimize {
            options.optimize = false;
        }
        if args.strip_comments {
            options.keep_comments = false;
        }
        if let Some(width) = args.indent_width {
            options = options.with_indent_width(Some(usize::from(width)));
        }
        Self { args, options }
    }

    /// Get the resolved translator options.
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    fn input_path(&self) -> Option<&Path> {
        self.args
            .input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }

    /// Name of the input as shown in error messages.
    pub fn input_name(&self) -> String {
        match self.input_path() {
            Some(path) => path.display().to_string(),
            None => STDIN_NAME.to_string(),
        }
    }

    fn read_source(&self) -> Result<String> {
        let source = match self.input_path() {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("Failed to read standard input")?;
                source
            }
        };
        Ok(source)
    }

    fn render(&self, source: &str, file: &str) -> Result<String> {
        let translator = Translator::new(self.options.clone());
        let located = |error: TranslateError| RexError::Translate {
            file: file.to_string(),
            source: error,
        };

        if self.args.tokens {
            let tokens = translator.tokens(source).map_err(located)?;
            Ok(tokens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        } else if self.args.ast {
            let (program, _) = translator.parse(source).map_err(located)?;
            serde_json::to_string_pretty(&program).map_err(|e| RexError::Other(e.into()))
        } else {
            translator.translate(source).map_err(located)
        }
    }

    fn write_output(&self, path: &Path, text: &str) -> Result<()> {
        let mut contents = text.to_string();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

impl Command for TranslateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let source = self.read_source()?;
        let file = self.input_name();
        tracing::debug!("Translating {} ({} bytes)", file, source.len());

        let text = self.render(&source, &file)?;

        match &self.args.output {
            Some(path) => {
                self.write_output(path, &text)?;
                ui.success(&format!("Wrote {}", path.display()));
            }
            None => ui.message(text.trim_end_matches('\n')),
        }
        ui.detail(&format!(
            "{} (optimize: {}, comments: {})",
            file, self.options.optimize, self.options.keep_comments
        ));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Stage;
    use crate::ui::MockUI;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("main.rb");
        fs::write(&path, content).unwrap();
        path
    }

    fn command(input: PathBuf) -> TranslateCommand {
        TranslateCommand::new(
            &RexConfig::default(),
            TranslateArgs {
                input: Some(input),
                ..Default::default()
            },
        )
    }

    #[test]
    fn flags_override_config() {
        let mut config = RexConfig::default();
        config.translate.indent_width = Some(4);
        let args = TranslateArgs {
            no_optimize: true,
            strip_comments: true,
            indent_width: Some(2),
            ..Default::default()
        };

        let cmd = TranslateCommand::new(&config, args);

        assert!(!cmd.options().optimize);
        assert!(!cmd.options().keep_comments);
        assert_eq!(cmd.options().indent, "  ");
    }

    #[test]
    fn config_indent_applies_without_flag() {
        let mut config = RexConfig::default();
        config.translate.indent_width = Some(4);
        let cmd = TranslateCommand::new(&config, TranslateArgs::default());
        assert_eq!(cmd.options().indent, "    ");
    }

    #[test]
    fn dash_means_stdin() {
        let cmd = command(PathBuf::from("-"));
        assert_eq!(cmd.input_name(), "<stdin>");
    }

    #[test]
    fn translates_file_to_stdout() {
        let temp = TempDir::new().unwrap();
        let cmd = command(source_file(&temp, "x = 2 * 3\nputs(x)\n"));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.messages(), ["x <- 6\nprint(x)"]);
    }

    #[test]
    fn writes_output_file() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("main.R");
        let cmd = TranslateCommand::new(
            &RexConfig::default(),
            TranslateArgs {
                input: Some(source_file(&temp, "puts(\"hi\")\n")),
                output: Some(out.clone()),
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "print(\"hi\")\n");
        assert!(ui.has_success("main.R"));
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn tokens_flag_dumps_tokens() {
        let temp = TempDir::new().unwrap();
        let cmd = TranslateCommand::new(
            &RexConfig::default(),
            TranslateArgs {
                input: Some(source_file(&temp, "x = 1")),
                tokens: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert_eq!(
            ui.messages(),
            ["IDENT:x:1:1\nASSIGN:1:3\nINTEGER:1:1:5\nEOF:1:6"]
        );
    }

    #[test]
    fn ast_flag_dumps_json() {
        let temp = TempDir::new().unwrap();
        let cmd = TranslateCommand::new(
            &RexConfig::default(),
            TranslateArgs {
                input: Some(source_file(&temp, "puts(1)\n")),
                ast: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert!(value["body"].is_array());
    }

    #[test]
    fn errors_name_the_input_file() {
        let temp = TempDir::new().unwrap();
        let cmd = command(source_file(&temp, "puts(y)\n"));
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();

        match &err {
            RexError::Translate { file, source } => {
                assert!(file.ends_with("main.rb"));
                assert_eq!(source.stage, Stage::Semantic);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(err.to_string().contains("main.rb:1:6: semantic error"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cmd = command(temp.path().join("absent.rb"));
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
