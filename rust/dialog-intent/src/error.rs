//! Error types for the intent matcher.
//!
//! Nothing here is raised by the matching pipeline itself: an utterance that
//! matches nothing is an [`Outcome::NoMatch`](crate::engine::Outcome), not an
//! error. These types cover the edges around it: building the knowledge
//! registry, reading it from disk, parsing configuration, and the external
//! collaborators the pipeline talks to.

use std::path::PathBuf;

use thiserror::Error;

use crate::knowledge::Origin;

/// Knowledge that cannot be admitted into a [`Registry`](crate::knowledge::Registry).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnowledgeError {
    #[error("entry #{index} of {origin} has no usable tokens")]
    EmptyTokens { origin: Origin, index: usize },

    #[error("entry #{index} of {origin} has priority {priority}, expected 1.0 to 5.0")]
    PriorityOutOfRange {
        origin: Origin,
        index: usize,
        priority: f64,
    },

    #[error("command '{command}' has no recognised prefix (expected 'py:' or 'url:')")]
    UnknownCommandPrefix { command: String },

    #[error("module id must not be empty")]
    EmptyModuleId,

    #[error("module '{id}' is registered twice")]
    DuplicateModule { id: String },
}

/// Failure to read knowledge from a brain directory.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("base knowledge file not found: {path}")]
    MissingBaseData { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

/// Invalid matcher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse matcher config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fuzzy cutoff must be in (0, 1], got {0}")]
    InvalidCutoff(f64),

    #[error("{name} must be a finite number no smaller than {minimum}, got {value}")]
    InvalidBonus {
        name: &'static str,
        value: f64,
        minimum: f64,
    },
}

/// Failure to build an [`IntentEngine`](crate::engine::IntentEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A lexical collaborator (synonym source or similarity function) that
/// cannot answer right now. The engine degrades to whatever technique is
/// left instead of failing the query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical collaborator '{collaborator}' is unavailable: {reason}")]
pub struct LexiconUnavailable {
    pub collaborator: String,
    pub reason: String,
}

impl LexiconUnavailable {
    pub fn new(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        LexiconUnavailable {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by an [`Executor`](crate::dispatch::Executor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Failed(String),

    #[error("no executor accepts {kind} payloads")]
    Unsupported { kind: String },
}
