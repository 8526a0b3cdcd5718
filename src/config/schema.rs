//! Configuration schema definitions.
//!
//! These structs map to the YAML configuration file format. Every field
//! has a default, so an empty or missing file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RexError};
use crate::gap::DEFAULT_SEQUENCE;
use crate::translate::TranslateOptions;
use crate::ui::OutputMode;

/// Allowed values for `translate.indent_width`.
pub const INDENT_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 1..=8;

/// Root configuration structure for `.rex/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RexConfig {
    /// Global settings
    pub settings: Settings,

    /// Translator settings
    pub translate: TranslateSettings,

    /// Gap finder settings
    pub gap: GapSettings,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Output mode used when neither `--verbose` nor `--quiet` is given.
    pub default_output: OutputMode,
}

/// Settings for `rex translate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateSettings {
    /// Fold constants and remove dead code.
    pub optimize: bool,

    /// Carry comments into the generated R.
    pub keep_comments: bool,

    /// Indent with this many spaces instead of a tab.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_width: Option<usize>,
}

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            optimize: true,
            keep_comments: true,
            indent_width: None,
        }
    }
}

/// Settings for `rex gap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapSettings {
    /// Sequence searched when no numbers are given on the command line.
    pub sequence: Vec<i64>,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            sequence: DEFAULT_SEQUENCE.to_vec(),
        }
    }
}

impl RexConfig {
    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(width) = self.translate.indent_width {
            if !INDENT_WIDTH_RANGE.contains(&width) {
                return Err(RexError::ConfigValidationError {
                    message: format!(
                        "translate.indent_width must be between {} and {}, got {}",
                        INDENT_WIDTH_RANGE.start(),
                        INDENT_WIDTH_RANGE.end(),
                        width
                    ),
                });
            }
        }
        Ok(())
    }

    /// Translator options described by this configuration.
    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            optimize: self.translate.optimize,
            keep_comments: self.translate.keep_comments,
            ..TranslateOptions::default()
        }
        .with_indent_width(self.translate.indent_width)
    }
}
