//! Normalization: splitting an utterance into words and canonical tokens.
//!
//! Every whitespace-delimited word of the input keeps its slot, even when it
//! is dropped as a stop word, so later stages can map a canonical token back
//! to the exact word it came from:
//!
//! ```text
//! "Open the YouTube, brackeys!"
//!   0:"Open"  1:"the"  2:"YouTube,"  3:"brackeys!"
//!   open      (stop)   youtube       brackey
//! ```
//!
//! Stemming is a pure function over an ordered suffix table. The table is
//! data ([`SuffixTable`]), so a different language means a different table,
//! not different code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::MatcherConfig;

/// Suffixes the stemmer may strip, plus the length limits that keep it from
/// eating short words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuffixTable {
    pub suffixes: Vec<String>,
    /// Words shorter than this (in characters) are never stemmed.
    pub min_word_len: usize,
    /// A suffix is only stripped if at least this many characters remain.
    pub min_stem_len: usize,
}

impl Default for SuffixTable {
    fn default() -> Self {
        SuffixTable {
            suffixes: ["ing", "est", "ly", "ed", "es", "er", "s"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_word_len: 4,
            min_stem_len: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SuffixRule {
    suffix: String,
    chars: usize,
}

/// A suffix-stripping stemmer.
///
/// Rules are tried longest first (ties keep table order) and the first rule
/// that applies wins; there is no backtracking and no second pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stemmer {
    rules: Vec<SuffixRule>,
    min_word_len: usize,
    min_stem_len: usize,
}

impl Stemmer {
    pub fn new(table: &SuffixTable) -> Self {
        let mut rules: Vec<SuffixRule> = table
            .suffixes
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| SuffixRule {
                suffix: s.to_lowercase(),
                chars: s.chars().count(),
            })
            .collect();
        rules.sort_by(|a, b| b.chars.cmp(&a.chars));

        Stemmer {
            rules,
            min_word_len: table.min_word_len,
            min_stem_len: table.min_stem_len,
        }
    }

    /// Reduce a lowercase word to its root.
    pub fn stem(&self, word: &str) -> String {
        let len = word.chars().count();
        if len < self.min_word_len {
            return word.to_string();
        }

        for rule in &self.rules {
            if len >= rule.chars + self.min_stem_len {
                if let Some(root) = word.strip_suffix(rule.suffix.as_str()) {
                    return root.to_string();
                }
            }
        }

        word.to_string()
    }
}

impl Default for Stemmer {
    fn default() -> Self {
        Stemmer::new(&SuffixTable::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    /// Contributes a canonical token.
    Content,
    /// A stop word or a word below the minimum length.
    Stop,
    /// Nothing left after stripping punctuation.
    Blank,
}

/// One whitespace-delimited word of the utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word exactly as typed.
    pub original: String,
    /// Lowercased, with surrounding punctuation trimmed. Inner symbols such
    /// as the `#` in `c#` survive.
    pub raw: String,
    /// Lowercased alphanumerics only.
    pub clean: String,
    /// The stem of `clean`, computed for every word including stop words.
    pub stem: String,
    /// Zero-based index among the whitespace-delimited words.
    pub position: usize,
    pub kind: WordKind,
}

impl Word {
    /// The form compared against stemmed trigger keywords. Words carrying
    /// symbols (`c#`) cannot be stemmed meaningfully and keep their raw form.
    pub fn keyword_form(&self) -> &str {
        if self.raw == self.clean {
            &self.stem
        } else {
            &self.raw
        }
    }
}

/// A canonical token together with the word slot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalToken {
    pub value: String,
    pub position: usize,
}

/// A normalized utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub words: Vec<Word>,
    /// Canonical tokens in word order.
    pub tokens: Vec<CanonicalToken>,
}

impl Utterance {
    /// True when no word survived normalization.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn word(&self, position: usize) -> Option<&Word> {
        self.words.get(position)
    }
}

/// Lowercases, strips punctuation, drops stop words and stems.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stop_words: BTreeSet<String>,
    min_word_len: usize,
    stemmer: Stemmer,
}

impl Normalizer {
    pub fn new(config: &MatcherConfig) -> Self {
        Normalizer {
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            min_word_len: config.min_word_len,
            stemmer: Stemmer::new(&config.stemmer),
        }
    }

    pub fn stemmer(&self) -> &Stemmer {
        &self.stemmer
    }

    pub fn normalize(&self, text: &str) -> Utterance {
        let mut words = Vec::new();
        let mut tokens = Vec::new();

        for (position, original) in text.split_whitespace().enumerate() {
            let word = self.word(original, position);
            if word.kind == WordKind::Content {
                tokens.push(CanonicalToken {
                    value: word.stem.clone(),
                    position,
                });
            }
            words.push(word);
        }

        Utterance {
            text: text.to_string(),
            words,
            tokens,
        }
    }

    /// Canonical forms of every content word in `phrase`, deduplicated in
    /// first-seen order. Used for entry tokens.
    pub fn canonical_terms(&self, phrase: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for token in self.normalize(phrase).tokens {
            if !terms.contains(&token.value) {
                terms.push(token.value);
            }
        }
        terms
    }

    fn word(&self, original: &str, position: usize) -> Word {
        let lowered = original.to_lowercase();
        let raw = lowered
            .trim_matches(|c: char| !(c.is_alphanumeric() || c == '#' || c == '+'))
            .to_string();
        let clean: String = lowered.chars().filter(|c| c.is_alphanumeric()).collect();
        let stem = self.stemmer.stem(&clean);

        let kind = if clean.is_empty() {
            WordKind::Blank
        } else if clean.chars().count() < self.min_word_len || self.stop_words.contains(&clean) {
            WordKind::Stop
        } else {
            WordKind::Content
        };

        Word {
            original: original.to_string(),
            raw,
            clean,
            stem,
            position,
            kind,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(&MatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(utterance: &Utterance) -> Vec<(&str, usize)> {
        utterance
            .tokens
            .iter()
            .map(|t| (t.value.as_str(), t.position))
            .collect()
    }

    #[test]
    fn stems_longest_suffix_first() {
        let stemmer = Stemmer::default();
        assert_eq!(stemmer.stem("playing"), "play");
        assert_eq!(stemmer.stem("lists"), "list");
        assert_eq!(stemmer.stem("quickly"), "quick");
        assert_eq!(stemmer.stem("fastest"), "fast");
        assert_eq!(stemmer.stem("opened"), "open");
    }

    #[test]
    fn leaves_short_words_alone() {
        let stemmer = Stemmer::default();
        assert_eq!(stemmer.stem("is"), "is");
        assert_eq!(stemmer.stem("bus"), "bus");
        // "br" would be too short a root, and no shorter suffix applies
        assert_eq!(stemmer.stem("bring"), "bring");
    }

    #[test]
    fn stemmer_sorts_custom_table_by_length() {
        let stemmer = Stemmer::new(&SuffixTable {
            suffixes: vec!["s".into(), "ness".into()],
            min_word_len: 4,
            min_stem_len: 3,
        });
        assert_eq!(stemmer.stem("darkness"), "dark");
    }

    #[test]
    fn keeps_word_positions_across_stop_words() {
        let normalizer = Normalizer::default();
        let utterance = normalizer.normalize("What's the TIME, please?");

        assert_eq!(utterance.words.len(), 4);
        assert_eq!(values(&utterance), vec![("what", 0), ("time", 2)]);
        assert_eq!(utterance.words[1].kind, WordKind::Stop);
        assert_eq!(utterance.words[2].original, "TIME,");
        assert_eq!(utterance.words[2].raw, "time");
    }

    #[test]
    fn all_stop_words_yield_no_tokens() {
        let normalizer = Normalizer::default();
        let utterance = normalizer.normalize("could you do it");
        assert!(utterance.is_empty());
        assert_eq!(utterance.words.len(), 4);
    }

    #[test]
    fn punctuation_only_words_are_blank() {
        let normalizer = Normalizer::default();
        let utterance = normalizer.normalize("open -- youtube");
        assert_eq!(utterance.words[1].kind, WordKind::Blank);
        assert_eq!(values(&utterance), vec![("open", 0), ("youtube", 2)]);
    }

    #[test]
    fn raw_form_keeps_inner_symbols() {
        let normalizer = Normalizer::default();
        let utterance = normalizer.normalize("teach me (c#)!");
        assert_eq!(utterance.words[2].raw, "c#");
        assert_eq!(utterance.words[2].clean, "c");
    }

    #[test]
    fn canonical_terms_dedup_after_stemming() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.canonical_terms("list lists the listing"),
            vec!["list".to_string()]
        );
    }
}
