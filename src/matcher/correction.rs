//! Optional character substitution after normalization.
//!
//! Dot-matrix print makes some glyph pairs hard to tell apart. A declared
//! [`SubstitutionTable`] rewrites them; [`Gating`] decides whether every
//! candidate is rewritten or only candidates that failed validation gain a
//! corrected sibling.

use super::validate::is_valid;
use crate::error::ConfigError;
use crate::models::{Candidate, CandidateSource, CodeRule, is_code_char};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Character-to-character replacement table. Both sides lie in `[A-Z0-9]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<char, char>", into = "BTreeMap<char, char>")]
pub struct SubstitutionTable {
    map: BTreeMap<char, char>,
}

impl SubstitutionTable {
    /// Build a table, rejecting entries outside `[A-Z0-9]`.
    pub fn new(pairs: impl IntoIterator<Item = (char, char)>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for (from, to) in pairs {
            if !is_code_char(from) || !is_code_char(to) {
                return Err(ConfigError::InvalidSubstitution { from, to });
            }
            map.insert(from, to);
        }
        Ok(Self { map })
    }

    /// Letters commonly read in place of digits on numeric-heavy codes.
    pub fn letters_to_digits() -> Self {
        let map = [('O', '0'), ('I', '1'), ('Z', '7'), ('S', '5'), ('G', '6'), ('B', '8')]
            .into_iter()
            .collect();
        Self { map }
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite `text`, leaving unmapped characters alone.
    pub fn apply(&self, text: &str) -> String {
        text.chars().map(|c| *self.map.get(&c).unwrap_or(&c)).collect()
    }
}

impl TryFrom<BTreeMap<char, char>> for SubstitutionTable {
    type Error = ConfigError;

    fn try_from(map: BTreeMap<char, char>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<SubstitutionTable> for BTreeMap<char, char> {
    fn from(table: SubstitutionTable) -> Self {
        table.map
    }
}

/// When substitutions are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gating {
    /// Replace every candidate with its corrected form
    Always,
    /// Keep the candidate and add a corrected sibling right after it when
    /// the original fails validation
    #[default]
    WhenInvalid,
}

/// Post-normalization substitution hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correction {
    /// Replacements
    pub table: SubstitutionTable,
    /// Application policy
    pub gating: Gating,
}

impl Correction {
    /// Run the hook over one orientation's candidates, preserving order.
    ///
    /// Texts that already appeared earlier in the list are dropped.
    pub fn apply(&self, candidates: Vec<Candidate>, rule: &CodeRule) -> Vec<Candidate> {
        if self.table.is_empty() {
            return candidates;
        }

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(candidates.len());
        let mut push = |candidate: Candidate| {
            if seen.insert(candidate.text().to_string()) {
                out.push(candidate);
            }
        };

        for candidate in candidates {
            let corrected = self.table.apply(candidate.text());
            let changed = corrected != candidate.text();
            match self.gating {
                Gating::Always if changed => push(Candidate::from_clean(
                    corrected,
                    candidate.orientation(),
                    CandidateSource::Corrected,
                )),
                Gating::Always => push(candidate),
                Gating::WhenInvalid => {
                    let sibling = (changed && !is_valid(&candidate, rule)).then(|| {
                        Candidate::from_clean(
                            corrected,
                            candidate.orientation(),
                            CandidateSource::Corrected,
                        )
                    });
                    push(candidate);
                    if let Some(sibling) = sibling {
                        push(sibling);
                    }
                }
            }
        }

        out
    }
}
