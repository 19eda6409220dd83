//! Exact validation against a [`CodeRule`].

use crate::models::{Candidate, CodeRule};

/// Exact length, and the digit count is allowed by the rule.
pub fn is_valid(candidate: &Candidate, rule: &CodeRule) -> bool {
    candidate.len() == rule.length() && rule.digits_ok(candidate.digit_count())
}

/// First candidate, in iteration order, that satisfies `rule`.
pub fn first_valid<'a, I>(candidates: I, rule: &CodeRule) -> Option<&'a Candidate>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    candidates.into_iter().find(|c| is_valid(c, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateSource, Orientation};

    fn cand(text: &str) -> Candidate {
        Candidate::from_clean(text.to_string(), Orientation::Deg0, CandidateSource::Token(0))
    }

    #[test]
    fn test_digit_rule() {
        let rule = CodeRule::new(9).unwrap().with_digit_counts([0, 2]);
        assert!(is_valid(&cand("KRATINGAB"), &rule));
        assert!(is_valid(&cand("KRAT1N2AB"), &rule));
        assert!(!is_valid(&cand("KRAT1N2A3"), &rule));
    }

    #[test]
    fn test_length_must_be_exact() {
        let rule = CodeRule::default();
        assert!(is_valid(&cand("KRAT1N2A3"), &rule));
        assert!(!is_valid(&cand("KRATINGA"), &rule));
        assert!(!is_valid(&cand("KRATINGABC"), &rule));
    }

    #[test]
    fn test_first_valid_keeps_order() {
        let rule = CodeRule::new(3).unwrap();
        let list = [cand("AB"), cand("XYZ"), cand("ABC")];
        assert_eq!(first_valid(&list, &rule).map(Candidate::text), Some("XYZ"));
        assert!(first_valid(&list[..1], &rule).is_none());
    }
}
