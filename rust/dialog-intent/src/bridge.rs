//! The bridge: deciding which modules take part in a query.
//!
//! A module joins the active knowledge set only when one of its trigger
//! keywords occurs in the utterance. Keywords are matched word-aligned, as a
//! contiguous run of words, against either form of the utterance:
//!
//! - the raw words (lowercased, surrounding punctuation trimmed), so symbol
//!   keywords like `c#` or `c++` work;
//! - the stemmed words, so `lists` triggers a module keyed on `list`.
//!   Words carrying symbols keep their raw form here too.
//!
//! Activation is a pure function of the query and the registry. Nothing is
//! remembered between queries.

use crate::knowledge::{Entry, Module, ModuleId, Registry, TriggerKeyword};
use crate::normalize::{Utterance, WordKind};

/// The entries that take part in one query: all core entries, then the
/// entries of each triggered module in registration order.
#[derive(Debug, Clone)]
pub struct ActiveSet<'a> {
    entries: Vec<&'a Entry>,
    modules: Vec<&'a ModuleId>,
}

impl<'a> ActiveSet<'a> {
    pub fn entries(&self) -> &[&'a Entry] {
        &self.entries
    }

    /// Ids of the modules that were triggered, in registration order.
    pub fn modules(&self) -> &[&'a ModuleId] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the active knowledge set for `utterance`.
pub fn activate<'a>(registry: &'a Registry, utterance: &Utterance) -> ActiveSet<'a> {
    let triggered = triggered_modules(registry, utterance);

    let entries = registry
        .core()
        .iter()
        .chain(triggered.iter().flat_map(|m| m.entries().iter()))
        .collect();
    let modules = triggered.iter().map(|m| m.id()).collect();

    ActiveSet { entries, modules }
}

/// Modules with at least one trigger keyword present, each listed once.
pub fn triggered_modules<'a>(registry: &'a Registry, utterance: &Utterance) -> Vec<&'a Module> {
    let raw: Vec<&str> = content_words(utterance, |w| w.raw.as_str());
    let stemmed: Vec<&str> = content_words(utterance, |w| w.keyword_form());

    registry
        .modules()
        .iter()
        .filter(|module| {
            module
                .triggers()
                .iter()
                .any(|trigger| keyword_present(trigger, &raw, &stemmed))
        })
        .collect()
}

fn content_words<'u>(
    utterance: &'u Utterance,
    form: impl Fn(&'u crate::normalize::Word) -> &'u str,
) -> Vec<&'u str> {
    utterance
        .words
        .iter()
        .filter(|w| w.kind != WordKind::Blank)
        .map(form)
        .collect()
}

fn keyword_present(trigger: &TriggerKeyword, raw: &[&str], stemmed: &[&str]) -> bool {
    contains_run(raw, &trigger.raw) || contains_run(stemmed, &trigger.stemmed)
}

fn contains_run(haystack: &[&str], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| *a == b.as_str()))
}
