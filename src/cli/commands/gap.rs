//! Gap command implementation.
//!
//! The `rex gap` command prints the value missing from a sequence.

use crate::cli::args::GapArgs;
use crate::error::{Result, RexError};
use crate::gap::analyze;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The gap command implementation.
pub struct GapCommand {
    sequence: Vec<i64>,
    args: GapArgs,
}

impl GapCommand {
    /// Create a gap command. `default_sequence` is used when no numbers
    /// were given on the command line.
    pub fn new(default_sequence: &[i64], args: GapArgs) -> Self {
        let sequence = if args.numbers.is_empty() {
            default_sequence.to_vec()
        } else {
            args.numbers.clone()
        };
        Self { sequence, args }
    }

    /// The sequence that will be searched.
    pub fn sequence(&self) -> &[i64] {
        &self.sequence
    }
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Command for GapCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = analyze(&self.sequence)?;

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| RexError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        ui.detail(&format!("Sequence: {}", join(&report.sequence)));
        ui.detail(&format!("Differences: {}", join(&report.differences)));
        ui.detail(&format!(
            "Step {}, gap between {} and {}",
            report.step, report.gap_pair.0, report.gap_pair.1
        ));
        if report.irregularities > 1 {
            ui.warning(&format!(
                "{} pairs deviate from step {}; filled the first",
                report.irregularities, report.step
            ));
        }
        ui.message(&report.missing.to_string());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::{GapError, DEFAULT_SEQUENCE};
    use crate::ui::{MockUI, OutputMode};

    fn args(numbers: &[i64]) -> GapArgs {
        GapArgs {
            numbers: numbers.to_vec(),
            json: false,
        }
    }

    #[test]
    fn default_sequence_prints_eight() {
        let cmd = GapCommand::new(&DEFAULT_SEQUENCE, GapArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(ui.messages(), ["8"]);
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn numbers_override_default_sequence() {
        let cmd = GapCommand::new(&DEFAULT_SEQUENCE, args(&[10, 20, 40]));
        assert_eq!(cmd.sequence(), [10, 20, 40]);

        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.messages(), ["30"]);
    }

    #[test]
    fn verbose_mode_explains_result() {
        let cmd = GapCommand::new(&DEFAULT_SEQUENCE, GapArgs::default());
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_detail("Differences: 2, 2, 4"));
        assert!(ui.has_detail("Step 2, gap between 6 and 10"));
    }

    #[test]
    fn several_irregularities_warn() {
        let cmd = GapCommand::new(&[], args(&[1, 2, 3, 5, 6, 8]));
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.messages(), ["4"]);
        assert!(ui.has_warning("2 pairs deviate from step 1"));
    }

    #[test]
    fn json_outputs_report() {
        let cmd = GapCommand::new(
            &DEFAULT_SEQUENCE,
            GapArgs {
                numbers: Vec::new(),
                json: true,
            },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(value["missing"], 8);
        assert_eq!(value["step"], 2);
        assert_eq!(value["gap_pair"], serde_json::json!([6, 10]));
    }

    #[test]
    fn regular_sequence_is_an_error() {
        let cmd = GapCommand::new(&[], args(&[1, 2, 3, 4, 5]));
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();

        assert!(matches!(err, RexError::Gap(GapError::NoGapFound { step: 1 })));
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn short_sequence_is_an_error() {
        let cmd = GapCommand::new(&[], args(&[5]));
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(matches!(
            err,
            RexError::Gap(GapError::InsufficientInput { len: 1 })
        ));
    }
}
