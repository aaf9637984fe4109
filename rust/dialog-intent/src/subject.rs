//! Subject extraction.
//!
//! The subject is what the user said after the last word that helped the
//! winning entry match, taken from the original input:
//!
//! ```text
//! "Open YouTube Brackeys tutorials"
//!        ^^^^^^^ last match at position 1
//! subject = "Brackeys tutorials"
//! ```

use crate::normalize::Utterance;
use crate::score::MatchResult;

/// Words strictly after the last matched position, joined by single spaces.
///
/// Empty when the last matched word is also the last word, or when nothing
/// matched.
pub fn extract_subject(utterance: &Utterance, winner: &MatchResult<'_>) -> String {
    subject_after(utterance, winner.matched_token_positions.iter().copied().max())
}

pub fn subject_after(utterance: &Utterance, last_match: Option<usize>) -> String {
    let Some(last) = last_match else {
        return String::new();
    };

    utterance
        .words
        .iter()
        .skip(last + 1)
        .map(|word| word.original.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
