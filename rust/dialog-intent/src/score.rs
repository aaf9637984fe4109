//! Scoring active entries against the query tokens.
//!
//! Every factor is multiplicative, so a score is easy to take apart:
//!
//! ```text
//! score = matches × priority × module_boost × (1 + verb_bonus) × unique_bonus
//! ```
//!
//! - `matches`: distinct query tokens found in the entry's token set
//! - `module_boost`: applied to entries of a triggered module
//! - `verb_bonus`: applied when any word of the utterance is an action verb
//! - `unique_bonus`: applied when some matched token is carried by exactly
//!   one active entry
//!
//! Only entries with at least one match produce a [`MatchResult`].

use std::collections::BTreeSet;

use crate::bridge::ActiveSet;
use crate::config::MatcherConfig;
use crate::knowledge::Entry;
use crate::lexicon::LexiconIndex;
use crate::normalize::{CanonicalToken, Utterance};

/// The multipliers the scorer applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub module_boost: f64,
    pub unique_bonus: f64,
    pub verb_bonus: f64,
}

impl From<&MatcherConfig> for Weights {
    fn from(config: &MatcherConfig) -> Self {
        Weights {
            module_boost: config.module_boost,
            unique_bonus: config.unique_bonus,
            verb_bonus: config.verb_bonus,
        }
    }
}

/// The factors behind one entry's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub matches: usize,
    pub priority: f64,
    pub module_boost: f64,
    pub verb_bonus: f64,
    pub unique_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.matches as f64
            * self.priority
            * self.module_boost
            * (1.0 + self.verb_bonus)
            * self.unique_bonus
    }
}

/// How one entry fared against one query.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub entry: &'a Entry,
    pub match_count: usize,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Word positions of every query token that matched, ascending.
    pub matched_token_positions: Vec<usize>,
}

/// True when any word of the utterance, stop words included, is an action verb.
pub fn has_action_verb(utterance: &Utterance, action_verbs: &BTreeSet<String>) -> bool {
    utterance
        .words
        .iter()
        .any(|word| action_verbs.contains(&word.clean))
}

/// Score every active entry against `tokens`.
///
/// Results come back in active-set order and only for entries with at
/// least one match; an empty result means the exact pass found nothing.
pub fn score_entries<'a>(
    active: &ActiveSet<'a>,
    index: &LexiconIndex<'a>,
    tokens: &[CanonicalToken],
    verb_present: bool,
    weights: &Weights,
) -> Vec<MatchResult<'a>> {
    let mut results = Vec::new();

    for &entry in active.entries() {
        let mut matched: BTreeSet<&str> = BTreeSet::new();
        let mut positions = Vec::new();

        for token in tokens {
            if entry.tokens().contains(&token.value) {
                matched.insert(token.value.as_str());
                positions.push(token.position);
            }
        }

        if matched.is_empty() {
            continue;
        }

        let unique = matched
            .iter()
            .any(|token| index.distinct_entry_count_for(token) == 1);

        let breakdown = ScoreBreakdown {
            matches: matched.len(),
            priority: entry.priority(),
            module_boost: if entry.origin().is_core() {
                1.0
            } else {
                weights.module_boost
            },
            verb_bonus: if verb_present { weights.verb_bonus } else { 0.0 },
            unique_bonus: if unique { weights.unique_bonus } else { 1.0 },
        };
        let score = breakdown.total();

        tracing::trace!(
            entry = %entry.id(),
            origin = %entry.origin(),
            matches = breakdown.matches,
            score,
            "scored entry"
        );

        results.push(MatchResult {
            entry,
            match_count: breakdown.matches,
            score,
            breakdown,
            matched_token_positions: positions,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::activate;
    use crate::knowledge::{EntryDefinition, EntryId, ModuleDefinition, Registry};
    use crate::normalize::Normalizer;
    use pretty_assertions::assert_eq;

    fn weights() -> Weights {
        Weights::from(&MatcherConfig::default())
    }

    fn score(registry: &Registry, text: &str) -> Vec<(EntryId, f64, Vec<usize>)> {
        let normalizer = Normalizer::default();
        let utterance = normalizer.normalize(text);
        let active = activate(registry, &utterance);
        let index = LexiconIndex::build(&active);
        let verb = has_action_verb(&utterance, &MatcherConfig::default().action_verbs);

        score_entries(&active, &index, &utterance.tokens, verb, &weights())
            .into_iter()
            .map(|r| (r.entry.id(), r.score, r.matched_token_positions))
            .collect()
    }

    #[test]
    fn core_entry_without_bonuses() {
        let registry = Registry::new(
            vec![
                EntryDefinition::new(["time"], 5.0),
                EntryDefinition::new(["time", "zone"], 2.0),
            ],
            vec![],
            &Normalizer::default(),
        )
        .unwrap();

        // "time" is carried by two entries, so no unique bonus
        assert_eq!(
            score(&registry, "what's the time"),
            vec![(EntryId(0), 5.0, vec![2]), (EntryId(1), 2.0, vec![2])]
        );
    }

    #[test]
    fn unique_token_earns_bonus() {
        let registry = Registry::new(
            vec![EntryDefinition::new(["time"], 5.0)],
            vec![],
            &Normalizer::default(),
        )
        .unwrap();

        assert_eq!(score(&registry, "what's the time"), vec![(EntryId(0), 9.0, vec![2])]);
    }

    #[test]
    fn module_entry_gets_boost_and_counts_each_token_once() {
        let registry = Registry::new(
            vec![EntryDefinition::new(["python"], 1.0)],
            vec![ModuleDefinition::new("python", ["python", "py"])
                .entry(EntryDefinition::new(["list", "python"], 3.0))],
            &Normalizer::default(),
        )
        .unwrap();

        let results = score(&registry, "how do i use python lists");
        // core: 1 × 1.0, "python" shared
        assert_eq!(results[0], (EntryId(0), 1.0, vec![4]));
        // module: 2 × 3.0 × 3.0 × 1.8 ("list" is unique)
        let (id, total, positions) = &results[1];
        assert_eq!(*id, EntryId(1));
        assert!((total - 2.0 * 3.0 * 3.0 * 1.8).abs() < 1e-9);
        assert_eq!(positions, &vec![4, 5]);

        let repeated = score(&registry, "python python lists");
        assert!((repeated[1].1 - 2.0 * 3.0 * 3.0 * 1.8).abs() < 1e-9);
        assert_eq!(repeated[1].2, vec![0, 1, 2]);
    }

    #[test]
    fn action_verb_anywhere_applies_bonus() {
        let registry = Registry::new(
            vec![
                EntryDefinition::new(["youtube"], 4.5),
                EntryDefinition::new(["youtube", "music"], 1.0),
            ],
            vec![],
            &Normalizer::default(),
        )
        .unwrap();

        let results = score(&registry, "open youtube brackeys");
        assert_eq!(results[0], (EntryId(0), 4.5 * 1.5, vec![1]));
    }

    #[test]
    fn no_results_when_nothing_matches() {
        let registry = Registry::new(
            vec![EntryDefinition::new(["time"], 5.0)],
            vec![],
            &Normalizer::default(),
        )
        .unwrap();
        assert!(score(&registry, "sing me a song").is_empty());
    }
}
