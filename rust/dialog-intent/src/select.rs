//! Choosing the winner among scored entries.
//!
//! Candidates are ordered by, in turn:
//!
//! 1. score, highest first;
//! 2. entry priority, highest first;
//! 3. origin, core before module;
//! 4. registration order, earliest first.
//!
//! Entry ids are unique, so the order is total and the winner never depends
//! on the order the candidates were produced in.

use std::cmp::Ordering;

use crate::score::MatchResult;

/// `Less` when `a` ranks ahead of `b`.
pub fn rank(a: &MatchResult<'_>, b: &MatchResult<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.entry.priority().total_cmp(&a.entry.priority()))
        .then_with(|| origin_rank(a).cmp(&origin_rank(b)))
        .then_with(|| a.entry.id().cmp(&b.entry.id()))
}

fn origin_rank(result: &MatchResult<'_>) -> u8 {
    if result.entry.origin().is_core() { 0 } else { 1 }
}

/// Sort candidates best first.
pub fn sort_candidates(candidates: &mut [MatchResult<'_>]) {
    candidates.sort_by(rank);
}

/// The single best candidate, if any.
pub fn select<'a, 'r>(candidates: &'r [MatchResult<'a>]) -> Option<&'r MatchResult<'a>> {
    candidates.iter().min_by(|a, b| rank(a, b))
}
