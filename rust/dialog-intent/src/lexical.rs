//! Lexical collaborators used by fallback matching.
//!
//! The engine does not know where synonyms or string similarity come from.
//! It talks to two small traits and ships simple implementations of each:
//!
//! - [`SynonymSource`]: [`NoSynonyms`] and the map-backed [`SynonymTable`]
//! - [`Similarity`]: [`SequenceRatio`], the Ratcliff/Obershelp ratio
//!
//! Either collaborator may report itself unavailable; the engine then skips
//! that technique for the query and records the degradation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::LexiconUnavailable;

pub trait SynonymSource: Send + Sync {
    /// Synonyms of `word`, possibly empty. Multi-word synonyms are allowed.
    fn synonyms_of(&self, word: &str) -> Result<BTreeSet<String>, LexiconUnavailable>;
}

pub trait Similarity: Send + Sync {
    /// Symmetric similarity in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> Result<f64, LexiconUnavailable>;
}

/// A synonym source that never knows any synonyms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynonyms;

impl SynonymSource for NoSynonyms {
    fn synonyms_of(&self, _word: &str) -> Result<BTreeSet<String>, LexiconUnavailable> {
        Ok(BTreeSet::new())
    }
}

/// A collaborator whose backing resource is missing.
#[derive(Debug, Clone)]
pub struct Unavailable {
    name: String,
    reason: String,
}

impl Unavailable {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Unavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn error(&self) -> LexiconUnavailable {
        LexiconUnavailable::new(self.name.clone(), self.reason.clone())
    }
}

impl SynonymSource for Unavailable {
    fn synonyms_of(&self, _word: &str) -> Result<BTreeSet<String>, LexiconUnavailable> {
        Err(self.error())
    }
}

impl Similarity for Unavailable {
    fn similarity(&self, _a: &str, _b: &str) -> Result<f64, LexiconUnavailable> {
        Err(self.error())
    }
}

/// Symmetric synonym table.
///
/// Loaded from a JSON object mapping a word to its synonyms:
///
/// ```
/// use dialog_intent::lexical::{SynonymSource, SynonymTable};
///
/// let table = SynonymTable::from_json_str(r#"{ "film": ["movie", "picture"] }"#).unwrap();
/// assert!(table.synonyms_of("movie").unwrap().contains("film"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct SynonymTable {
    synonyms: BTreeMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Record `word` and each of `synonyms` as synonyms of one another.
    pub fn insert<I, S>(&mut self, word: &str, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let word = word.trim().to_lowercase();
        for synonym in synonyms {
            let synonym = synonym.as_ref().trim().to_lowercase();
            if synonym.is_empty() || synonym == word {
                continue;
            }
            self.synonyms
                .entry(word.clone())
                .or_default()
                .insert(synonym.clone());
            self.synonyms
                .entry(synonym)
                .or_default()
                .insert(word.clone());
        }
    }

    pub fn with(mut self, word: &str, synonyms: &[&str]) -> Self {
        self.insert(word, synonyms);
        self
    }
}

impl From<BTreeMap<String, Vec<String>>> for SynonymTable {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut table = SynonymTable::new();
        for (word, synonyms) in map {
            table.insert(&word, synonyms);
        }
        table
    }
}

impl SynonymSource for SynonymTable {
    fn synonyms_of(&self, word: &str) -> Result<BTreeSet<String>, LexiconUnavailable> {
        Ok(self
            .synonyms
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Ratcliff/Obershelp similarity: `2·M / (|a| + |b|)`, where `M` counts the
/// characters in the longest common block plus, recursively, the blocks to
/// its left and right.
///
/// The block search breaks ties by position in its first argument, so the
/// raw ratio depends on argument order. The ratio is taken both ways and the
/// larger one kept, which makes it symmetric.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, LexiconUnavailable> {
        Ok(sequence_ratio(a, b))
    }
}

pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b).max(matching_chars(&b, &a));
    2.0 * matched as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Start in `a`, start in `b`, and length of the longest common block.
/// Ties go to the earliest block in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = previous[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        previous = current;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ratio_of_identical_and_disjoint_words() {
        assert_eq!(sequence_ratio("python", "python"), 1.0);
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn ratio_counts_blocks_on_both_sides() {
        // "bcd" is common: 2 * 3 / 8
        assert_eq!(sequence_ratio("abcd", "bcde"), 0.75);
        // "yout" + "ube": 2 * 7 / 15
        let ratio = sequence_ratio("youtube", "youtsube");
        assert!((ratio - 14.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_is_symmetric_for_typos() {
        let forward = sequence_ratio("weather", "wether");
        let backward = sequence_ratio("wether", "weather");
        assert_eq!(forward, backward);
        assert!(forward >= 0.75);
    }

    fn words_over(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut words = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            frontier = frontier
                .iter()
                .flat_map(|w| alphabet.iter().map(move |c| format!("{w}{c}")))
                .collect();
            words.extend(frontier.iter().cloned());
        }
        words
    }

    #[test]
    fn ratio_is_symmetric_for_every_pair() {
        let words = words_over(&['a', 'b', 'c'], 4);
        for a in &words {
            for b in &words {
                let forward = sequence_ratio(a, b);
                let backward = sequence_ratio(b, a);
                assert_eq!(forward, backward, "{a:?} vs {b:?}");
                assert!((0.0..=1.0).contains(&forward), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn ratio_takes_the_better_block_order() {
        // scanning "abca" first pairs its leading "a" and strands the "b"
        assert_eq!(sequence_ratio("ba", "abca"), 2.0 * 2.0 / 6.0);
        assert_eq!(sequence_ratio("abca", "ba"), 2.0 * 2.0 / 6.0);
    }

    #[test]
    fn table_is_symmetric() {
        let table = SynonymTable::new().with("film", &["movie", "Picture"]);
        assert_eq!(
            table.synonyms_of("film").unwrap(),
            BTreeSet::from(["movie".to_string(), "picture".to_string()])
        );
        assert_eq!(
            table.synonyms_of("PICTURE").unwrap(),
            BTreeSet::from(["film".to_string()])
        );
        assert!(table.synonyms_of("song").unwrap().is_empty());
    }

    #[test]
    fn table_loads_from_json() {
        let table = SynonymTable::from_json_str(r#"{ "clock": ["time", "clock"] }"#).unwrap();
        assert_eq!(
            table.synonyms_of("time").unwrap(),
            BTreeSet::from(["clock".to_string()])
        );
    }

    #[test]
    fn unavailable_collaborator_reports_itself() {
        let wordnet = Unavailable::new("wordnet", "database not installed");
        let error = wordnet.synonyms_of("film").unwrap_err();
        assert_eq!(error.collaborator, "wordnet");
        assert!(wordnet.similarity("a", "b").is_err());
    }
}
