//! # Dialog Intent: deterministic keyword intent matching
//!
//! Matches a short spoken or typed utterance against a body of hand-written
//! knowledge entries and produces a response, plus an optional command for
//! the front end to run.
//!
//! ## Core Ideas
//!
//! - **Knowledge is data**: entries carry tokens, a priority, a response
//!   template and an optional tagged command. They are validated once, when
//!   the [`Registry`](knowledge::Registry) is built.
//! - **Modules are opt-in**: topic modules take part in a query only when
//!   one of their trigger keywords appears in it. Activation is recomputed
//!   per query; nothing leaks from one query into the next.
//! - **Scores explain themselves**: every factor of a score is kept in a
//!   [`ScoreBreakdown`](score::ScoreBreakdown), and ties are broken by a
//!   fixed total order, so the same input always picks the same entry.
//! - **Commands are payloads**: `py:` and `url:` commands leave the engine
//!   as [`DispatchPayload`](dispatch::DispatchPayload)s. Running them is the
//!   business of an [`Executor`](dispatch::Executor).
//!
//! ## Architecture
//!
//! ```text
//! Utterance → Normalize → Activate (core + triggered modules)
//!   → Index → Score ─┬─ matched ─────────────────────────┐
//!                    └─ nothing: Fallback (synonym, fuzzy) → Score once more
//!   → Select → Subject → Render → (text, payload) → Executor
//! ```
//!
//! ## Example
//!
//! ```
//! use dialog_intent::config::MatcherConfig;
//! use dialog_intent::engine::IntentEngine;
//! use dialog_intent::knowledge::{EntryDefinition, ModuleDefinition};
//!
//! let engine = IntentEngine::build(
//!     vec![EntryDefinition::new(["youtube"], 4.5)
//!         .respond("Looking up {subject} on YouTube.")
//!         .command("url:https://www.youtube.com/results?search_query={subject}")],
//!     vec![ModuleDefinition::new("python", ["python", "py"])
//!         .entry(EntryDefinition::new(["list", "python"], 3.0).respond("Lists use []."))],
//!     MatcherConfig::default(),
//! )
//! .unwrap();
//!
//! let response = engine.respond("open youtube brackeys", "Ada", "Isaac");
//! assert_eq!(response.text, "Looking up brackeys on YouTube.");
//! assert_eq!(
//!     response.dispatch.unwrap().body,
//!     "https://www.youtube.com/results?search_query=brackeys"
//! );
//! ```

pub mod assistant;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod knowledge;
pub mod lexical;
pub mod lexicon;
pub mod normalize;
pub mod render;
pub mod score;
pub mod select;
pub mod source;
pub mod subject;

pub use assistant::Assistant;
pub use config::MatcherConfig;
pub use dispatch::{DispatchPayload, Executor};
pub use engine::{Evaluation, IntentEngine, NoMatchReason, Outcome};
pub use render::{Identities, Rendered};
