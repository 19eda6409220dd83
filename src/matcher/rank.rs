//! Near-miss ranking.
//!
//! Only consulted when no candidate is exactly valid. Candidates outside the
//! rule's length band are dropped; the rest are ordered by the digit-count
//! predicate, then by distance from the required length, then by position.

use crate::models::{Candidate, CodeRule};

/// Ordering key: digit predicate first, then distance from the target length.
/// Lower is better.
fn score(candidate: &Candidate, rule: &CodeRule) -> (bool, usize) {
    (
        !rule.digits_ok(candidate.digit_count()),
        candidate.len().abs_diff(rule.length()),
    )
}

/// Pick the closest near-miss once exact validation has failed everywhere.
///
/// Candidates outside the rule's length band are discarded. Among the rest,
/// candidates passing the digit predicate win, then the smallest length
/// difference, then the first one seen. Returns `None` rather than
/// inventing a result when the band is empty.
pub fn rank<I>(candidates: I, rule: &CodeRule) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    let band = rule.length_band();
    let mut best: Option<((bool, usize), Candidate)> = None;

    for candidate in candidates {
        if !band.contains(&candidate.len()) {
            continue;
        }
        let key = score(&candidate, rule);
        // Strictly better only, so ties stay with the earlier candidate
        if best.as_ref().is_none_or(|(best_key, _)| key < *best_key) {
            best = Some((key, candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}
