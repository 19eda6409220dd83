//! Extraction outcome.

use super::{CodeRule, Orientation};
use serde::Serialize;

/// Outcome of one full extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// A candidate satisfied the code rule exactly
    Exact {
        /// Validated code
        code: String,
        /// Orientation that produced it
        orientation: Orientation,
    },
    /// Nothing validated; this is the closest near-miss
    BestGuess {
        /// Fallback string
        code: String,
        /// Orientation that produced it
        orientation: Orientation,
    },
    /// No plausible candidate was observed
    NotFound,
}

impl ExtractionResult {
    /// The code string, exact or best guess
    pub fn code(&self) -> Option<&str> {
        match self {
            ExtractionResult::Exact { code, .. } | ExtractionResult::BestGuess { code, .. } => {
                Some(code)
            }
            ExtractionResult::NotFound => None,
        }
    }

    /// True for an exact match
    pub fn is_exact(&self) -> bool {
        matches!(self, ExtractionResult::Exact { .. })
    }

    /// True when nothing was found
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExtractionResult::NotFound)
    }

    /// Orientation the result was read at
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            ExtractionResult::Exact { orientation, .. }
            | ExtractionResult::BestGuess { orientation, .. } => Some(*orientation),
            ExtractionResult::NotFound => None,
        }
    }

    /// Short validity caption for display next to the code.
    pub fn caption(&self, rule: &CodeRule) -> String {
        match self {
            ExtractionResult::Exact { .. } => {
                format!("complete: {} characters", rule.length())
            }
            ExtractionResult::BestGuess { code, .. } => {
                format!("read {} characters, please check", code.len())
            }
            ExtractionResult::NotFound => "no code found".to_string(),
        }
    }
}
