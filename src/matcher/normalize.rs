//! Token cleaning and candidate generation.

use crate::models::{Candidate, CandidateSource, Orientation, is_code_char};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which candidate generators run. Both are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeStrategy {
    /// Each token cleaned on its own
    pub per_token: bool,
    /// Tokens joined, then the full string and every length-`L` window
    pub concatenated: bool,
}

impl Default for NormalizeStrategy {
    fn default() -> Self {
        Self {
            per_token: true,
            concatenated: true,
        }
    }
}

/// Uppercase and drop everything outside `[A-Z0-9]`.
pub fn clean(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_uppercase)
        .filter(|&c| is_code_char(c))
        .collect()
}

/// Turn one orientation's raw tokens into candidates.
///
/// Output order is per-token candidates, the concatenated string, then
/// windows by ascending offset. Repeated texts keep their first occurrence
/// and empty strings are dropped.
pub fn normalize<S: AsRef<str>>(
    tokens: &[S],
    rule_length: usize,
    orientation: Orientation,
    strategy: NormalizeStrategy,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |text: String, source: CandidateSource| {
        if !text.is_empty() && seen.insert(text.clone()) {
            out.push(Candidate::from_clean(text, orientation, source));
        }
    };

    if strategy.per_token {
        for (index, token) in tokens.iter().enumerate() {
            push(clean(token.as_ref()), CandidateSource::Token(index));
        }
    }

    if strategy.concatenated {
        let joined: String = tokens.iter().map(|t| clean(t.as_ref())).collect();
        push(joined.clone(), CandidateSource::Concatenated);
        if rule_length > 0 && joined.len() > rule_length {
            // joined is ASCII, so byte offsets are char offsets
            for offset in 0..=joined.len() - rule_length {
                push(
                    joined[offset..offset + rule_length].to_string(),
                    CandidateSource::Window(offset),
                );
            }
        }
    }

    out
}
