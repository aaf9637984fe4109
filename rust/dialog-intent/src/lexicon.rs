//! Lexicon index over the active knowledge set.
//!
//! Maps each canonical token to the entries that carry it. The index is
//! derived data: it is built from an [`ActiveSet`] for one query and
//! dropped with it.

use std::collections::BTreeMap;

use crate::bridge::ActiveSet;
use crate::knowledge::Entry;

#[derive(Debug, Clone, Default)]
pub struct LexiconIndex<'a> {
    buckets: BTreeMap<&'a str, Vec<&'a Entry>>,
}

impl<'a> LexiconIndex<'a> {
    pub fn build(active: &ActiveSet<'a>) -> Self {
        let mut buckets: BTreeMap<&'a str, Vec<&'a Entry>> = BTreeMap::new();

        for &entry in active.entries() {
            for token in entry.tokens() {
                let bucket = buckets.entry(token.as_str()).or_default();
                // entry identity, not value: equal entries from different
                // origins stay distinct
                if !bucket.iter().any(|e| e.id() == entry.id()) {
                    bucket.push(entry);
                }
            }
        }

        LexiconIndex { buckets }
    }

    /// Entries carrying `token`, in active-set order.
    pub fn entries_containing(&self, token: &str) -> &[&'a Entry] {
        self.buckets.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct active entries carrying `token`.
    pub fn distinct_entry_count_for(&self, token: &str) -> usize {
        self.entries_containing(token).len()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.buckets.contains_key(token)
    }

    /// Every indexed token, in lexicographic order.
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
