//! Missing-term detection for integer sequences.
//!
//! A sequence such as `2, 4, 6, 10` is expected to advance by a constant
//! step. The step is taken to be the most common consecutive difference,
//! and the first adjacent pair that does not advance by it marks the gap.
//!
//! # Example
//!
//! ```
//! use rex::gap::find_missing;
//!
//! assert_eq!(find_missing(&[2, 4, 6, 10]).unwrap(), 8);
//! ```

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// Sequence used when no numbers are given.
pub const DEFAULT_SEQUENCE: [i64; 4] = [2, 4, 6, 10];

/// Errors produced while locating a gap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GapError {
    /// Fewer than two numbers were given, so there are no differences.
    #[error("Insufficient input: need at least 2 numbers, got {len}")]
    InsufficientInput { len: usize },

    /// Every consecutive difference equals the dominant step.
    #[error("No gap found: every consecutive difference is {step}")]
    NoGapFound { step: i64 },

    /// A difference or the filled value does not fit in an `i64`.
    #[error("Arithmetic overflow while computing the gap")]
    Overflow,
}

/// Full breakdown of a gap search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapReport {
    /// The input sequence.
    pub sequence: Vec<i64>,
    /// Consecutive differences, one shorter than `sequence`.
    pub differences: Vec<i64>,
    /// The dominant step.
    pub step: i64,
    /// First adjacent pair whose difference is not `step`.
    pub gap_pair: (i64, i64),
    /// The value that fills the gap.
    pub missing: i64,
    /// Number of adjacent pairs that deviate from `step`.
    pub irregularities: usize,
}

/// Compute the differences between adjacent elements.
///
/// # Errors
///
/// Returns [`GapError::InsufficientInput`] for fewer than two elements and
/// [`GapError::Overflow`] if a difference does not fit in an `i64`.
pub fn differences(sequence: &[i64]) -> Result<Vec<i64>, GapError> {
    if sequence.len() < 2 {
        return Err(GapError::InsufficientInput {
            len: sequence.len(),
        });
    }

    sequence
        .windows(2)
        .map(|pair| pair[1].checked_sub(pair[0]).ok_or(GapError::Overflow))
        .collect()
}

/// Find the most frequent value in `differences`.
///
/// When several values share the highest count, the one that occurs first
/// wins. Returns `None` for an empty slice.
pub fn dominant_step(differences: &[i64]) -> Option<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &d in differences {
        *counts.entry(d).or_default() += 1;
    }

    let max = counts.values().copied().max()?;
    differences.iter().copied().find(|d| counts[d] == max)
}

/// Analyze a sequence and describe its gap.
///
/// # Errors
///
/// See [`GapError`].
pub fn analyze(sequence: &[i64]) -> Result<GapReport, GapError> {
    let differences = differences(sequence)?;
    let step = dominant_step(&differences).ok_or(GapError::InsufficientInput {
        len: sequence.len(),
    })?;

    let mut deviating = differences
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d != step)
        .map(|(i, _)| i);

    let first = deviating.next().ok_or(GapError::NoGapFound { step })?;
    let irregularities = 1 + deviating.count();

    let gap_pair = (sequence[first], sequence[first + 1]);
    let missing = gap_pair.0.checked_add(step).ok_or(GapError::Overflow)?;

    tracing::debug!(
        step,
        missing,
        irregularities,
        "Located gap between {} and {}",
        gap_pair.0,
        gap_pair.1
    );

    Ok(GapReport {
        sequence: sequence.to_vec(),
        differences,
        step,
        gap_pair,
        missing,
        irregularities,
    })
}

/// Return the value that fills the first gap in `sequence`.
///
/// # Errors
///
/// See [`GapError`].
pub fn find_missing(sequence: &[i64]) -> Result<i64, GapError> {
    analyze(sequence).map(|report| report.missing)
}
