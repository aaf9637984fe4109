//! Fallback substitution for queries the exact pass cannot place.
//!
//! Fallback runs only when no active entry matched a single query token.
//! Each query token missing from the lexicon index is then replaced, if
//! possible, by a token the index does know:
//!
//! 1. synonym expansion: the first synonym (in sorted order) whose single
//!    canonical form is indexed;
//! 2. fuzzy matching: the indexed token most similar to the query token,
//!    if the similarity reaches the cutoff. Ties go to the token that sorts
//!    first.
//!
//! A substituted token keeps the word position of the word it replaces, so
//! subject extraction still refers to the words the user actually said.

use std::fmt;

use crate::error::LexiconUnavailable;
use crate::lexical::{Similarity, SynonymSource};
use crate::lexicon::LexiconIndex;
use crate::normalize::{CanonicalToken, Normalizer, Utterance};

/// How a replacement token was found.
#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionSource {
    Synonym { synonym: String },
    Fuzzy { similarity: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub position: usize,
    pub original: String,
    pub replacement: String,
    pub source: SubstitutionSource,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            SubstitutionSource::Synonym { synonym } => write!(
                f,
                "{} -> {} (synonym '{}')",
                self.original, self.replacement, synonym
            ),
            SubstitutionSource::Fuzzy { similarity } => write!(
                f,
                "{} -> {} (similarity {:.2})",
                self.original, self.replacement, similarity
            ),
        }
    }
}

/// A lexical collaborator that could not serve this query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    SynonymsUnavailable(LexiconUnavailable),
    SimilarityUnavailable(LexiconUnavailable),
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::SynonymsUnavailable(e) => write!(f, "synonyms: {e}"),
            Degradation::SimilarityUnavailable(e) => write!(f, "similarity: {e}"),
        }
    }
}

/// The substituted query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fallback {
    pub tokens: Vec<CanonicalToken>,
    pub substitutions: Vec<Substitution>,
    pub degradations: Vec<Degradation>,
}

/// Collaborators and limits for one fallback pass.
pub struct FallbackContext<'c> {
    pub normalizer: &'c Normalizer,
    pub synonyms: &'c dyn SynonymSource,
    pub similarity: &'c dyn Similarity,
    pub cutoff: f64,
}

impl FallbackContext<'_> {
    /// Replace every unindexed token of `utterance` that has a synonym or a
    /// close enough indexed token.
    pub fn substitute(&self, utterance: &Utterance, index: &LexiconIndex<'_>) -> Fallback {
        let mut fallback = Fallback {
            tokens: utterance.tokens.clone(),
            ..Fallback::default()
        };
        let mut synonyms_available = true;
        let mut similarity_available = true;

        for token in fallback.tokens.iter_mut() {
            if index.contains(&token.value) {
                continue;
            }

            let mut found = None;

            if synonyms_available {
                let word = utterance
                    .word(token.position)
                    .map(|w| w.clean.as_str())
                    .unwrap_or(token.value.as_str());
                match self.synonym_for(word, index) {
                    Ok(hit) => found = hit,
                    Err(e) => {
                        tracing::warn!(error = %e, "synonym source unavailable, skipping synonym fallback");
                        fallback.degradations.push(Degradation::SynonymsUnavailable(e));
                        synonyms_available = false;
                    }
                }
            }

            if found.is_none() && similarity_available {
                match self.closest(&token.value, index) {
                    Ok(hit) => found = hit,
                    Err(e) => {
                        tracing::warn!(error = %e, "similarity unavailable, skipping fuzzy fallback");
                        fallback.degradations.push(Degradation::SimilarityUnavailable(e));
                        similarity_available = false;
                    }
                }
            }

            if let Some((replacement, source)) = found {
                let substitution = Substitution {
                    position: token.position,
                    original: token.value.clone(),
                    replacement: replacement.clone(),
                    source,
                };
                tracing::debug!(%substitution, "fallback substitution");
                token.value = replacement;
                fallback.substitutions.push(substitution);
            }
        }

        fallback
    }

    fn synonym_for(
        &self,
        word: &str,
        index: &LexiconIndex<'_>,
    ) -> Result<Option<(String, SubstitutionSource)>, LexiconUnavailable> {
        for synonym in self.synonyms.synonyms_of(word)? {
            let terms = self.normalizer.canonical_terms(&synonym);
            if let [term] = terms.as_slice() {
                if index.contains(term) {
                    return Ok(Some((
                        term.clone(),
                        SubstitutionSource::Synonym { synonym },
                    )));
                }
            }
        }
        Ok(None)
    }

    fn closest(
        &self,
        token: &str,
        index: &LexiconIndex<'_>,
    ) -> Result<Option<(String, SubstitutionSource)>, LexiconUnavailable> {
        let mut best: Option<(&str, f64)> = None;

        for candidate in index.tokens() {
            let similarity = self.similarity.similarity(token, candidate)?;
            if similarity >= self.cutoff && best.is_none_or(|(_, b)| similarity > b) {
                best = Some((candidate, similarity));
            }
        }

        Ok(best.map(|(candidate, similarity)| {
            (
                candidate.to_string(),
                SubstitutionSource::Fuzzy { similarity },
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::activate;
    use crate::knowledge::{EntryDefinition, Registry};
    use crate::lexical::{NoSynonyms, SequenceRatio, SynonymTable, Unavailable};
    use pretty_assertions::assert_eq;

    fn registry(normalizer: &Normalizer) -> Registry {
        Registry::new(
            vec![
                EntryDefinition::new(["weather"], 4.0),
                EntryDefinition::new(["joke"], 3.0),
                EntryDefinition::new(["movie"], 3.0),
            ],
            vec![],
            normalizer,
        )
        .unwrap()
    }

    fn run(
        text: &str,
        synonyms: &dyn SynonymSource,
        similarity: &dyn Similarity,
    ) -> Fallback {
        let normalizer = Normalizer::default();
        let registry = registry(&normalizer);
        let utterance = normalizer.normalize(text);
        let active = activate(&registry, &utterance);
        let index = LexiconIndex::build(&active);
        FallbackContext {
            normalizer: &normalizer,
            synonyms,
            similarity,
            cutoff: 0.75,
        }
        .substitute(&utterance, &index)
    }

    fn values(fallback: &Fallback) -> Vec<(&str, usize)> {
        fallback
            .tokens
            .iter()
            .map(|t| (t.value.as_str(), t.position))
            .collect()
    }

    #[test]
    fn synonym_takes_precedence_over_fuzzy() {
        let synonyms = SynonymTable::new().with("film", &["movie", "picture"]);
        let fallback = run("recommend a film", &synonyms, &SequenceRatio);

        assert_eq!(values(&fallback), vec![("recommend", 0), ("movie", 2)]);
        assert_eq!(
            fallback.substitutions[0].source,
            SubstitutionSource::Synonym {
                synonym: "movie".into()
            }
        );
    }

    #[test]
    fn fuzzy_replaces_typos() {
        let fallback = run("whats the wether", &NoSynonyms, &SequenceRatio);

        // "weather" is indexed under its stem
        assert_eq!(values(&fallback), vec![("what", 0), ("weath", 2)]);
        assert!(matches!(
            fallback.substitutions[0].source,
            SubstitutionSource::Fuzzy { similarity } if similarity >= 0.75
        ));
    }

    #[test]
    fn below_cutoff_is_left_alone() {
        let fallback = run("sing a song", &NoSynonyms, &SequenceRatio);
        assert!(fallback.substitutions.is_empty());
        assert_eq!(values(&fallback), vec![("sing", 0), ("song", 2)]);
    }

    #[test]
    fn unavailable_synonyms_degrade_to_fuzzy() {
        let wordnet = Unavailable::new("wordnet", "not installed");
        let fallback = run("tell a jok please", &wordnet, &SequenceRatio);

        assert_eq!(fallback.substitutions.len(), 1);
        assert_eq!(fallback.substitutions[0].replacement, "joke");
        assert_eq!(
            fallback.degradations,
            vec![Degradation::SynonymsUnavailable(LexiconUnavailable::new(
                "wordnet",
                "not installed"
            ))]
        );
    }

    #[test]
    fn both_collaborators_unavailable() {
        let down = Unavailable::new("lexicon", "offline");
        let fallback = run("wether", &down, &down);

        assert!(fallback.substitutions.is_empty());
        assert_eq!(fallback.degradations.len(), 2);
    }
}
