//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// rex - a gap finder, a greeting demo and a Ruby-subset to R translator.
///
/// Without a subcommand, runs the gap finder, the greeting demo and the
/// snippet port in order.
#[derive(Debug, Parser)]
#[command(name = "rex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .rex/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides discovery from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find the missing term of an arithmetic-like sequence
    Gap(GapArgs),

    /// Run the greeting demo
    Greet,

    /// Show the translated R snippet
    Snippet(SnippetArgs),

    /// Translate a Ruby-subset program to R
    Translate(TranslateArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `gap` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GapArgs {
    /// Sequence to search (defaults to gap.sequence from config)
    #[arg(allow_negative_numbers = true)]
    pub numbers: Vec<i64>,

    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `snippet` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SnippetArgs {
    /// Run the snippet's constructs instead of printing the R code
    #[arg(long, conflicts_with = "source")]
    pub run: bool,

    /// Print the Ruby program the snippet came from
    #[arg(long)]
    pub source: bool,
}

/// Arguments for the `translate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TranslateArgs {
    /// Ruby source file ("-" or absent reads stdin)
    pub input: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the token stream and stop
    #[arg(long, conflicts_with = "ast")]
    pub tokens: bool,

    /// Print the syntax tree as JSON and stop
    #[arg(long)]
    pub ast: bool,

    /// Skip constant folding and dead code removal
    #[arg(long)]
    pub no_optimize: bool,

    /// Drop comments from the output
    #[arg(long)]
    pub strip_comments: bool,

    /// Indent with N spaces instead of tabs
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=8))]
    pub indent_width: Option<u8>,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["rex"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn gap_accepts_negative_numbers() {
        let cli = Cli::try_parse_from(["rex", "gap", "-3", "-1", "3"]).unwrap();
        match cli.command {
            Some(Commands::Gap(args)) => assert_eq!(args.numbers, vec![-3, -1, 3]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["rex", "greet", "--quiet", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["rex", "-v", "-q", "greet"]).is_err());
    }

    #[test]
    fn translate_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "rex",
            "translate",
            "main.rb",
            "-o",
            "main.R",
            "--no-optimize",
            "--strip-comments",
            "--indent-width",
            "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Translate(args)) => {
                assert_eq!(args.input, Some(PathBuf::from("main.rb")));
                assert_eq!(args.output, Some(PathBuf::from("main.R")));
                assert!(args.no_optimize);
                assert!(args.strip_comments);
                assert_eq!(args.indent_width, Some(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn translate_rejects_wide_indent() {
        assert!(Cli::try_parse_from(["rex", "translate", "--indent-width", "9"]).is_err());
    }

    #[test]
    fn tokens_and_ast_conflict() {
        assert!(Cli::try_parse_from(["rex", "translate", "--tokens", "--ast"]).is_err());
    }

    #[test]
    fn snippet_run_and_source_conflict() {
        assert!(Cli::try_parse_from(["rex", "snippet", "--run", "--source"]).is_err());
    }
}
