//! Matcher configuration.
//!
//! Every tunable of the pipeline lives here as data: scoring constants, the
//! word tables the normalizer consults, the suffix table of the stemmer, and
//! the canned responses. Configuration is deserialized with `#[serde(default)]`
//! so a partial JSON document only overrides what it names:
//!
//! ```
//! use dialog_intent::config::MatcherConfig;
//!
//! let config = MatcherConfig::from_json_str(r#"{ "module_boost": 2.0 }"#).unwrap();
//! assert_eq!(config.module_boost, 2.0);
//! assert_eq!(config.unique_bonus, 1.8);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::normalize::SuffixTable;

/// Multiplier applied to entries that come from a triggered module.
pub const DEFAULT_MODULE_BOOST: f64 = 3.0;
/// Multiplier applied when a matched token occurs in exactly one active entry.
pub const DEFAULT_UNIQUE_BONUS: f64 = 1.8;
/// Added to 1.0 when the utterance contains an action verb.
pub const DEFAULT_VERB_BONUS: f64 = 0.5;
/// Minimum similarity accepted by fuzzy fallback.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.75;

const ACTION_VERBS: &[&str] = &[
    "open", "close", "search", "find", "look", "get", "take", "show", "display", "play", "stop",
    "start", "run", "execute", "tell", "say", "speak", "explain", "describe", "define",
];

// Question words stay out of this list: core entries key on them.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "i", "me", "my", "you", "your", "it", "its", "is", "are", "am", "be", "to",
    "of", "do", "does", "did", "can", "could", "would", "will", "please", "and", "or", "for",
    "computer", "isaac",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub module_boost: f64,
    pub unique_bonus: f64,
    pub verb_bonus: f64,
    pub fuzzy_cutoff: f64,
    pub action_verbs: BTreeSet<String>,
    pub stop_words: BTreeSet<String>,
    /// Words shorter than this (in characters) are dropped like stop words.
    pub min_word_len: usize,
    pub stemmer: SuffixTable,
    pub responses: Responses,
    /// Agent identity used for `{name}` when the caller supplies none.
    pub agent_name: String,
    /// User identity used for `{username}` when the caller supplies none.
    pub user_name: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            module_boost: DEFAULT_MODULE_BOOST,
            unique_bonus: DEFAULT_UNIQUE_BONUS,
            verb_bonus: DEFAULT_VERB_BONUS,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            action_verbs: ACTION_VERBS.iter().map(|w| w.to_string()).collect(),
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_word_len: 2,
            stemmer: SuffixTable::default(),
            responses: Responses::default(),
            agent_name: "Isaac".into(),
            user_name: "User".into(),
        }
    }
}

impl MatcherConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatcherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fuzzy_cutoff > 0.0 && self.fuzzy_cutoff <= 1.0) {
            return Err(ConfigError::InvalidCutoff(self.fuzzy_cutoff));
        }
        check_factor("module_boost", self.module_boost, 1.0)?;
        check_factor("unique_bonus", self.unique_bonus, 1.0)?;
        check_factor("verb_bonus", self.verb_bonus, 0.0)?;
        Ok(())
    }
}

fn check_factor(name: &'static str, value: f64, minimum: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= minimum {
        Ok(())
    } else {
        Err(ConfigError::InvalidBonus {
            name,
            value,
            minimum,
        })
    }
}

/// Fixed response texts. They go through the same placeholder substitution
/// as entry templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Responses {
    /// Nothing scored, even after fallback.
    pub no_match: String,
    /// The utterance had no canonical tokens at all.
    pub empty_input: String,
    /// A `url:` command needs a subject but none was given.
    pub missing_subject: String,
    /// Used when the winning entry has an empty response template.
    pub missing_template: String,
}

impl Default for Responses {
    fn default() -> Self {
        Responses {
            no_match: "I'm not sure I understand. Could you rephrase that?".into(),
            empty_input: "I'm sorry {username}, I didn't catch that.".into(),
            missing_subject: "Please specify what you want me to search for.".into(),
            missing_template: "I'm not sure how to respond.".into(),
        }
    }
}
