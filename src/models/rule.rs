//! The code rule: exact length, allowed digit counts and the ranker's
//! length tolerance.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Default code length (the cap codes this crate was built for are 9 characters)
pub const DEFAULT_CODE_LENGTH: usize = 9;

/// Default ranker band: candidates within `L ± 2` are near-misses
pub const DEFAULT_LENGTH_TOLERANCE: usize = 2;

/// Structural constraint a code must satisfy.
///
/// A rule is purely structural: exact length, plus an optional set of
/// allowed digit counts. `tolerance` only matters to the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRule {
    length: usize,
    #[serde(default)]
    digit_counts: Option<Vec<usize>>,
    #[serde(default = "default_tolerance")]
    tolerance: usize,
}

fn default_tolerance() -> usize {
    DEFAULT_LENGTH_TOLERANCE
}

impl CodeRule {
    /// Rule requiring exactly `length` characters, any digit count.
    pub fn new(length: usize) -> Result<Self, ConfigError> {
        let rule = Self {
            length,
            digit_counts: None,
            tolerance: DEFAULT_LENGTH_TOLERANCE,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Restrict the number of `[0-9]` characters to one of `counts`.
    pub fn with_digit_counts(mut self, counts: impl IntoIterator<Item = usize>) -> Self {
        let mut counts: Vec<usize> = counts.into_iter().collect();
        counts.sort_unstable();
        counts.dedup();
        self.digit_counts = Some(counts);
        self
    }

    /// Set the ranker's length band half-width.
    pub fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check invariants after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::InvalidRule("length must be at least 1".into()));
        }
        if let Some(counts) = &self.digit_counts {
            if counts.is_empty() {
                return Err(ConfigError::InvalidRule(
                    "digit-count set is empty, nothing could ever match".into(),
                ));
            }
            if let Some(&bad) = counts.iter().find(|&&c| c > self.length) {
                return Err(ConfigError::InvalidRule(format!(
                    "digit count {bad} exceeds code length {}",
                    self.length
                )));
            }
        }
        Ok(())
    }

    /// Required exact length
    pub fn length(&self) -> usize {
        self.length
    }

    /// Allowed digit counts, if constrained
    pub fn digit_counts(&self) -> Option<&[usize]> {
        self.digit_counts.as_deref()
    }

    /// Ranker band half-width
    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    /// Check the digit-count predicate. Always true when unconstrained.
    pub fn digits_ok(&self, digit_count: usize) -> bool {
        match &self.digit_counts {
            Some(counts) => counts.contains(&digit_count),
            None => true,
        }
    }

    /// Lengths the ranker considers plausible. Saturates at both ends.
    pub fn length_band(&self) -> RangeInclusive<usize> {
        self.length.saturating_sub(self.tolerance)..=self.length.saturating_add(self.tolerance)
    }
}

impl Default for CodeRule {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            digit_counts: None,
            tolerance: DEFAULT_LENGTH_TOLERANCE,
        }
    }
}
