//! The assistant: an engine, an executor, and who is talking.
//!
//! Front ends that only want a line of text to show or speak use this
//! instead of the engine directly. The response text is fixed before the
//! executor runs, so a failing command only adds a note to it.

use crate::dispatch::{annotate, Executor, NullExecutor};
use crate::engine::IntentEngine;
use crate::render::{Identities, Rendered};

pub struct Assistant {
    engine: IntentEngine,
    executor: Box<dyn Executor>,
    identities: Identities,
}

impl Assistant {
    /// An assistant that uses the engine's configured identities and
    /// executes nothing.
    pub fn new(engine: IntentEngine) -> Self {
        let identities = Identities::from(engine.config());
        Assistant {
            engine,
            executor: Box::new(NullExecutor),
            identities,
        }
    }

    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn with_identities(mut self, identities: Identities) -> Self {
        self.identities = identities;
        self
    }

    pub fn engine(&self) -> &IntentEngine {
        &self.engine
    }

    pub fn identities(&self) -> &Identities {
        &self.identities
    }

    /// Respond to `utterance`, running any dispatched command.
    pub fn process(&self, utterance: &str) -> String {
        let Rendered { text, dispatch } = self.engine.respond(
            utterance,
            &self.identities.user_name,
            &self.identities.agent_name,
        );

        let Some(payload) = dispatch else {
            return text;
        };

        let result = self.executor.execute(&payload);
        if let Err(e) = &result {
            tracing::warn!(%payload, error = %e, "dispatch failed");
        }
        annotate(&text, result)
    }
}
