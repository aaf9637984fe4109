//! Dispatch payloads: what a matched command asks the outside world to do.
//!
//! The engine never evaluates code or opens a browser. A matched entry with
//! a command produces a [`DispatchPayload`], a tagged, already-substituted
//! command body. Running it is the business of an [`Executor`] supplied by
//! the front end, which is also responsible for sandboxing it.
//!
//! ```text
//! url:https://www.youtube.com/results?search_query={subject}
//!   + subject "lofi beats"
//!   → DispatchPayload { kind: OpenUrl, body: "https://…?search_query=lofi+beats" }
//!   → Executor::execute → Ok(Some("[Opening in browser]"))
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::knowledge::CommandKind;

/// Note an executor returns after handing a URL to a browser.
pub const OPENING_IN_BROWSER: &str = "[Opening in browser]";

/// A command ready to be executed. The body is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub kind: CommandKind,
    pub body: String,
}

impl DispatchPayload {
    pub fn new(kind: CommandKind, body: impl Into<String>) -> Self {
        DispatchPayload {
            kind,
            body: body.into(),
        }
    }
}

impl fmt::Display for DispatchPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.body)
    }
}

/// Runs dispatch payloads on behalf of the assistant.
///
/// `Ok(Some(note))` is appended to the response text, `Ok(None)` leaves it
/// untouched, and an error is reported inline as `[Error: ...]`.
pub trait Executor: Send + Sync {
    fn execute(&self, payload: &DispatchPayload) -> Result<Option<String>, DispatchError>;
}

/// Accepts every payload and does nothing with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExecutor;

impl Executor for NullExecutor {
    fn execute(&self, _payload: &DispatchPayload) -> Result<Option<String>, DispatchError> {
        Ok(None)
    }
}

/// Adapts a closure into an [`Executor`].
pub struct FnExecutor<F>(pub F);

impl<F> Executor for FnExecutor<F>
where
    F: Fn(&DispatchPayload) -> Result<Option<String>, DispatchError> + Send + Sync,
{
    fn execute(&self, payload: &DispatchPayload) -> Result<Option<String>, DispatchError> {
        (self.0)(payload)
    }
}

/// Fold an execution result into the response text.
pub fn annotate(text: &str, result: Result<Option<String>, DispatchError>) -> String {
    match result {
        Ok(None) => text.to_string(),
        Ok(Some(note)) if note.is_empty() => text.to_string(),
        Ok(Some(note)) => format!("{text} {note}"),
        Err(e) => format!("{text} [Error: {e}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_displays_as_tagged_command() {
        let payload = DispatchPayload::new(CommandKind::OpenUrl, "https://example.com/?q=a+b");
        assert_eq!(payload.to_string(), "url:https://example.com/?q=a+b");
    }

    #[test]
    fn notes_are_appended() {
        assert_eq!(annotate("Sure.", Ok(None)), "Sure.");
        assert_eq!(
            annotate("Searching.", Ok(Some(OPENING_IN_BROWSER.into()))),
            "Searching. [Opening in browser]"
        );
        assert_eq!(
            annotate("Rolling.", Err(DispatchError::Failed("division by zero".into()))),
            "Rolling. [Error: division by zero]"
        );
    }

    #[test]
    fn closure_executor_sees_payload() {
        let executor = FnExecutor(|payload: &DispatchPayload| match payload.kind {
            CommandKind::OpenUrl => Ok(Some(OPENING_IN_BROWSER.to_string())),
            CommandKind::Evaluate => Err(DispatchError::Unsupported {
                kind: payload.kind.to_string(),
            }),
        });

        let evaluate = DispatchPayload::new(CommandKind::Evaluate, "1 + 1");
        assert_eq!(
            annotate("Result:", executor.execute(&evaluate)),
            "Result: [Error: no executor accepts evaluate payloads]"
        );
        assert!(NullExecutor.execute(&evaluate).unwrap().is_none());
    }
}
