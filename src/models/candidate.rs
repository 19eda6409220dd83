//! Cleaned candidate strings and where they came from.

use super::Orientation;

/// Where a candidate came from within one orientation's tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// A single recognizer token, cleaned on its own
    Token(usize),
    /// All tokens joined and cleaned
    Concatenated,
    /// A fixed-length window of the concatenated string, starting at this offset
    Window(usize),
    /// A substitution-corrected variant of another candidate
    Corrected,
}

/// A cleaned string over `[A-Z0-9]` considered as a possible code.
///
/// Only the normalizer and the correction hook build candidates, and both
/// construct them from characters already restricted to the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    text: String,
    orientation: Orientation,
    source: CandidateSource,
    digits: usize,
}

impl Candidate {
    /// Build a candidate from an already-clean string.
    ///
    /// Callers must guarantee every character is in `[A-Z0-9]`.
    pub(crate) fn from_clean(
        text: String,
        orientation: Orientation,
        source: CandidateSource,
    ) -> Self {
        debug_assert!(text.chars().all(is_code_char), "unclean candidate {text:?}");
        let digits = text.bytes().filter(u8::is_ascii_digit).count();
        Self {
            text,
            orientation,
            source,
            digits,
        }
    }

    /// Candidate text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters (all characters are ASCII)
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if the candidate has no characters
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of `[0-9]` characters
    pub fn digit_count(&self) -> usize {
        self.digits
    }

    /// Orientation that produced this candidate
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Provenance within the orientation
    pub fn source(&self) -> CandidateSource {
        self.source
    }

    /// Consume the candidate, returning its text
    pub fn into_text(self) -> String {
        self.text
    }
}

/// True for characters allowed in a code: `[A-Z0-9]`.
pub fn is_code_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}
