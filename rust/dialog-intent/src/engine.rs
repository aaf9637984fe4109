//! The intent engine: from an utterance to a response.
//!
//! Each query runs the same pipeline, and nothing survives from one query
//! to the next:
//!
//! ```text
//! utterance
//!   → normalize            words + canonical tokens
//!   → activate             core + triggered modules
//!   → index                token → entries
//!   → score                exact pass
//!       └─ fallback        only if nothing matched: substitute, score once more
//!   → select               total tie-break order
//!   → extract subject
//!   → render               text + optional dispatch payload
//! ```
//!
//! [`IntentEngine::respond`] is the entry point front ends call.
//! [`IntentEngine::evaluate`] returns the whole [`Evaluation`] for
//! inspection.

use std::fmt;

use crate::bridge::activate;
use crate::config::MatcherConfig;
use crate::error::EngineError;
use crate::fallback::{Degradation, FallbackContext, Substitution};
use crate::knowledge::{EntryDefinition, EntryId, ModuleDefinition, ModuleId, Registry};
use crate::lexical::{NoSynonyms, SequenceRatio, Similarity, SynonymSource};
use crate::lexicon::LexiconIndex;
use crate::normalize::{Normalizer, Utterance};
use crate::render::{fill, render, Identities, Rendered};
use crate::score::{has_action_verb, score_entries, MatchResult, Weights};
use crate::select::sort_candidates;
use crate::source::{BrainDir, KnowledgeSource};
use crate::subject::extract_subject;

/// Why a query produced no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    /// Every word was a stop word or punctuation.
    EmptyUtterance,
    /// Nothing scored, fallback included.
    Unrecognized,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::EmptyUtterance => write!(f, "empty utterance"),
            NoMatchReason::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched {
        entry: EntryId,
        score: f64,
        subject: String,
    },
    NoMatch(NoMatchReason),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched { .. })
    }
}

/// Everything the engine worked out for one query.
#[derive(Debug, Clone)]
pub struct Evaluation<'e> {
    pub utterance: Utterance,
    /// Triggered modules, in registration order.
    pub modules: Vec<&'e ModuleId>,
    /// Scored entries, best first.
    pub candidates: Vec<MatchResult<'e>>,
    /// Whether the exact pass came up empty and fallback ran.
    pub fallback_used: bool,
    pub substitutions: Vec<Substitution>,
    pub degradations: Vec<Degradation>,
    pub outcome: Outcome,
    pub response: Rendered,
}

impl<'e> Evaluation<'e> {
    pub fn winner(&self) -> Option<&MatchResult<'e>> {
        match self.outcome {
            Outcome::Matched { .. } => self.candidates.first(),
            Outcome::NoMatch(_) => None,
        }
    }
}

/// Matches utterances against a fixed body of knowledge.
///
/// The engine holds only read-only state, so one instance can serve any
/// number of queries, from any number of threads.
pub struct IntentEngine {
    registry: Registry,
    config: MatcherConfig,
    normalizer: Normalizer,
    synonyms: Box<dyn SynonymSource>,
    similarity: Box<dyn Similarity>,
}

impl fmt::Debug for IntentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentEngine")
            .field("knowledge", &self.registry.stats())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IntentEngine {
    /// Admit `core` and `modules` and build an engine around them.
    ///
    /// The configuration is validated first; an engine never runs with
    /// out-of-range weights or cutoff.
    pub fn build(
        core: Vec<EntryDefinition>,
        modules: Vec<ModuleDefinition>,
        config: MatcherConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let normalizer = Normalizer::new(&config);
        let registry = Registry::new(core, modules, &normalizer)?;
        Ok(Self::assemble(registry, config, normalizer))
    }

    pub fn from_source(source: KnowledgeSource, config: MatcherConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let normalizer = Normalizer::new(&config);
        let registry = source.into_registry(&normalizer)?;
        Ok(Self::assemble(registry, config, normalizer))
    }

    /// Load a brain directory and build an engine around it.
    pub fn load(brain: &BrainDir, config: MatcherConfig) -> Result<Self, EngineError> {
        Self::from_source(brain.load()?, config)
    }

    fn assemble(registry: Registry, config: MatcherConfig, normalizer: Normalizer) -> Self {
        IntentEngine {
            registry,
            config,
            normalizer,
            synonyms: Box::new(NoSynonyms),
            similarity: Box::new(SequenceRatio),
        }
    }

    pub fn with_synonyms(mut self, synonyms: impl SynonymSource + 'static) -> Self {
        self.synonyms = Box::new(synonyms);
        self
    }

    pub fn with_similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Respond to `utterance` on behalf of `agent_name`, addressing `user_name`.
    pub fn respond(&self, utterance: &str, user_name: &str, agent_name: &str) -> Rendered {
        self.evaluate_as(utterance, &Identities::new(user_name, agent_name))
            .response
    }

    /// Evaluate `utterance` with the configured identities.
    pub fn evaluate(&self, utterance: &str) -> Evaluation<'_> {
        self.evaluate_as(utterance, &Identities::from(&self.config))
    }

    pub fn evaluate_as(&self, text: &str, identities: &Identities) -> Evaluation<'_> {
        let utterance = self.normalizer.normalize(text);
        let active = activate(&self.registry, &utterance);
        let modules = active.modules().to_vec();

        tracing::debug!(
            tokens = utterance.tokens.len(),
            modules = ?modules.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
            "evaluating utterance"
        );

        if utterance.is_empty() {
            let reason = NoMatchReason::EmptyUtterance;
            tracing::debug!(%reason, "no match");
            return Evaluation {
                response: self.no_match_response(reason, identities),
                utterance,
                modules,
                candidates: Vec::new(),
                fallback_used: false,
                substitutions: Vec::new(),
                degradations: Vec::new(),
                outcome: Outcome::NoMatch(reason),
            };
        }

        let index = LexiconIndex::build(&active);
        let verb_present = has_action_verb(&utterance, &self.config.action_verbs);
        let weights = Weights::from(&self.config);

        let mut candidates =
            score_entries(&active, &index, &utterance.tokens, verb_present, &weights);
        let mut fallback_used = false;
        let mut substitutions = Vec::new();
        let mut degradations = Vec::new();

        if candidates.is_empty() {
            tracing::debug!("exact pass found nothing, trying fallback");
            fallback_used = true;

            let fallback = FallbackContext {
                normalizer: &self.normalizer,
                synonyms: self.synonyms.as_ref(),
                similarity: self.similarity.as_ref(),
                cutoff: self.config.fuzzy_cutoff,
            }
            .substitute(&utterance, &index);

            if !fallback.substitutions.is_empty() {
                candidates =
                    score_entries(&active, &index, &fallback.tokens, verb_present, &weights);
            }
            substitutions = fallback.substitutions;
            degradations = fallback.degradations;
        }

        sort_candidates(&mut candidates);

        let (outcome, response) = match candidates.first() {
            Some(winner) => {
                let subject = extract_subject(&utterance, winner);
                let response = render(winner.entry, &subject, identities, &self.config.responses);
                tracing::debug!(
                    candidates = candidates.len(),
                    winner = %winner.entry.id(),
                    score = winner.score,
                    subject = subject.as_str(),
                    "matched"
                );
                (
                    Outcome::Matched {
                        entry: winner.entry.id(),
                        score: winner.score,
                        subject,
                    },
                    response,
                )
            }
            None => {
                let reason = NoMatchReason::Unrecognized;
                tracing::debug!(%reason, "no match");
                (
                    Outcome::NoMatch(reason),
                    self.no_match_response(reason, identities),
                )
            }
        };

        Evaluation {
            utterance,
            modules,
            candidates,
            fallback_used,
            substitutions,
            degradations,
            outcome,
            response,
        }
    }

    fn no_match_response(&self, reason: NoMatchReason, identities: &Identities) -> Rendered {
        let template = match reason {
            NoMatchReason::EmptyUtterance => &self.config.responses.empty_input,
            NoMatchReason::Unrecognized => &self.config.responses.no_match,
        };
        Rendered::text(fill(template, "", identities))
    }
}
