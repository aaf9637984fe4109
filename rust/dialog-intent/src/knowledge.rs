//! Knowledge: entries, modules, and the registry that holds them.
//!
//! Knowledge arrives as definitions (what a knowledge file says) and is
//! admitted into a [`Registry`] as entries (what the matcher works with).
//! Admission is where malformed knowledge is rejected and where raw tokens
//! become canonical, so the matching pipeline only ever sees well-formed,
//! already-stemmed data.
//!
//! ```
//! use dialog_intent::knowledge::{EntryDefinition, ModuleDefinition, Registry};
//! use dialog_intent::normalize::Normalizer;
//!
//! let registry = Registry::new(
//!     vec![EntryDefinition::new(["time"], 5.0).respond("It is late.")],
//!     vec![ModuleDefinition::new("python", ["python", "py"])
//!         .entry(EntryDefinition::new(["list", "python"], 3.0).respond("Use [] for lists."))],
//!     &Normalizer::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(registry.stats().core_entries, 1);
//! assert_eq!(registry.stats().trigger_keywords, 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::KnowledgeError;
use crate::normalize::{Normalizer, WordKind};

pub const MIN_PRIORITY: f64 = 1.0;
pub const MAX_PRIORITY: f64 = 5.0;

/// Identity of an entry: its registration index. Core entries come first,
/// then each module's entries in module registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        ModuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an entry was registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    Core,
    Module(ModuleId),
}

impl Origin {
    pub fn is_core(&self) -> bool {
        matches!(self, Origin::Core)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Core => write!(f, "core knowledge"),
            Origin::Module(id) => write!(f, "module '{id}'"),
        }
    }
}

/// Which external collaborator a command is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// `py:` commands, evaluated by a sandboxed executor.
    Evaluate,
    /// `url:` commands, opened by a browser launcher.
    OpenUrl,
}

impl CommandKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CommandKind::Evaluate => "py:",
            CommandKind::OpenUrl => "url:",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Evaluate => write!(f, "evaluate"),
            CommandKind::OpenUrl => write!(f, "open-url"),
        }
    }
}

/// A side-effecting command attached to an entry. The body is opaque to
/// the matcher; only placeholders in it are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub body: String,
}

impl Command {
    /// Split a tagged command string (`py:...` or `url:...`).
    pub fn parse(command: &str) -> Result<Self, KnowledgeError> {
        let trimmed = command.trim();
        for kind in [CommandKind::Evaluate, CommandKind::OpenUrl] {
            if let Some(body) = trimmed.strip_prefix(kind.prefix()) {
                return Ok(Command {
                    kind,
                    body: body.trim().to_string(),
                });
            }
        }
        Err(KnowledgeError::UnknownCommandPrefix {
            command: command.to_string(),
        })
    }
}

/// An entry as written in a knowledge file.
///
/// The field names follow the on-disk format: `tokens` may be a single
/// string or a list, `val` is the priority, `resp` the response template and
/// `cmd` the optional command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDefinition {
    #[serde(deserialize_with = "one_or_many")]
    pub tokens: Vec<String>,
    #[serde(rename = "val")]
    pub priority: f64,
    #[serde(rename = "resp", default)]
    pub response: String,
    #[serde(rename = "cmd", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl EntryDefinition {
    pub fn new<I, S>(tokens: I, priority: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EntryDefinition {
            tokens: tokens.into_iter().map(Into::into).collect(),
            priority,
            response: String::new(),
            command: None,
        }
    }

    pub fn respond(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(token) => vec![token],
        OneOrMany::Many(tokens) => tokens,
    })
}

/// A module as described by the bridge mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub id: String,
    pub trigger_keywords: Vec<String>,
    pub entries: Vec<EntryDefinition>,
}

impl ModuleDefinition {
    pub fn new<I, S>(id: impl Into<String>, trigger_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModuleDefinition {
            id: id.into(),
            trigger_keywords: trigger_keywords.into_iter().map(Into::into).collect(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, entry: EntryDefinition) -> Self {
        self.entries.push(entry);
        self
    }
}

/// An admitted, immutable knowledge unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: EntryId,
    tokens: BTreeSet<String>,
    priority: f64,
    response_template: String,
    command: Option<Command>,
    origin: Origin,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Canonical tokens; never empty.
    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn response_template(&self) -> &str {
        &self.response_template
    }

    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// A trigger keyword in both of the forms the bridge compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerKeyword {
    /// The keyword as registered, lowercased.
    pub phrase: String,
    /// Per-word raw forms (`["c#"]`, `["c", "sharp"]`).
    pub raw: Vec<String>,
    /// Per-word stems.
    pub stemmed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    id: ModuleId,
    triggers: Vec<TriggerKeyword>,
    entries: Vec<Entry>,
}

impl Module {
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn triggers(&self) -> &[TriggerKeyword] {
        &self.triggers
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Summary of what a registry holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeStats {
    pub core_entries: usize,
    pub modules: usize,
    pub module_entries: usize,
    pub trigger_keywords: usize,
    pub module_ids: Vec<String>,
}

/// The registered knowledge: core entries plus every known module.
///
/// Populated once and read-only afterwards. Modules are only *registered*
/// here; which of them take part in a query is decided per query by the
/// [`bridge`](crate::bridge).
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    core: Vec<Entry>,
    modules: Vec<Module>,
}

impl Registry {
    pub fn new(
        core: Vec<EntryDefinition>,
        modules: Vec<ModuleDefinition>,
        normalizer: &Normalizer,
    ) -> Result<Self, KnowledgeError> {
        let mut next_id = 0;

        let core = admit_entries(core, Origin::Core, &mut next_id, normalizer)?;

        let mut admitted: Vec<Module> = Vec::with_capacity(modules.len());
        for definition in modules {
            let id = definition.id.trim();
            if id.is_empty() {
                return Err(KnowledgeError::EmptyModuleId);
            }
            if admitted.iter().any(|m| m.id.as_str() == id) {
                return Err(KnowledgeError::DuplicateModule { id: id.to_string() });
            }
            let id = ModuleId::new(id);

            let triggers = admit_triggers(&definition.trigger_keywords, normalizer);
            let entries = admit_entries(
                definition.entries,
                Origin::Module(id.clone()),
                &mut next_id,
                normalizer,
            )?;

            admitted.push(Module {
                id,
                triggers,
                entries,
            });
        }

        Ok(Registry {
            core,
            modules: admitted,
        })
    }

    pub fn core(&self) -> &[Entry] {
        &self.core
    }

    /// Modules in registration order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id.as_str() == id)
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            core_entries: self.core.len(),
            modules: self.modules.len(),
            module_entries: self.modules.iter().map(|m| m.entries.len()).sum(),
            trigger_keywords: self.modules.iter().map(|m| m.triggers.len()).sum(),
            module_ids: self.modules.iter().map(|m| m.id.to_string()).collect(),
        }
    }
}

fn admit_entries(
    definitions: Vec<EntryDefinition>,
    origin: Origin,
    next_id: &mut usize,
    normalizer: &Normalizer,
) -> Result<Vec<Entry>, KnowledgeError> {
    let mut entries = Vec::with_capacity(definitions.len());

    for (index, definition) in definitions.into_iter().enumerate() {
        let tokens: BTreeSet<String> = definition
            .tokens
            .iter()
            .flat_map(|phrase| normalizer.canonical_terms(phrase))
            .collect();
        if tokens.is_empty() {
            return Err(KnowledgeError::EmptyTokens {
                origin: origin.clone(),
                index,
            });
        }

        let priority = definition.priority;
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            return Err(KnowledgeError::PriorityOutOfRange {
                origin: origin.clone(),
                index,
                priority,
            });
        }

        let command = definition
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(Command::parse)
            .transpose()?;

        entries.push(Entry {
            id: EntryId(*next_id),
            tokens,
            priority,
            response_template: definition.response,
            command,
            origin: origin.clone(),
        });
        *next_id += 1;
    }

    Ok(entries)
}

fn admit_triggers(keywords: &[String], normalizer: &Normalizer) -> Vec<TriggerKeyword> {
    let mut triggers: Vec<TriggerKeyword> = Vec::new();

    for keyword in keywords {
        let words: Vec<_> = normalizer
            .normalize(keyword)
            .words
            .into_iter()
            .filter(|w| w.kind != WordKind::Blank)
            .collect();
        if words.is_empty() {
            continue;
        }

        let trigger = TriggerKeyword {
            phrase: keyword.trim().to_lowercase(),
            raw: words.iter().map(|w| w.raw.clone()).collect(),
            stemmed: words.iter().map(|w| w.keyword_form().to_string()).collect(),
        };
        if !triggers.iter().any(|t| t.raw == trigger.raw) {
            triggers.push(trigger);
        }
    }

    triggers
}
