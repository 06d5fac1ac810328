//! The global surface → entry index.

use kosha_types::{Entry, EntryId};
use std::collections::HashMap;

/// Outcome of resolving a reference surface against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one entry carries this surface.
    Unique(EntryId),
    /// Several entries carry this surface; `chosen` is the
    /// lexicographically smallest canonical id, recorded for human review.
    Ambiguous { chosen: EntryId, candidates: usize },
    Unresolved,
}

/// Index from every known surface (canonical headword, headword with
/// homonym ordinal, alternate spellings) to the entries carrying it.
///
/// Built once per run, then shared read-only across all parallel workers.
#[derive(Debug, Default)]
pub struct HeadwordIndex {
    /// Candidate ids per surface, kept sorted so the ambiguity tie-break
    /// is a plain first-element pick.
    by_surface: HashMap<String, Vec<EntryId>>,
    /// Canonical display label per entry id.
    labels: HashMap<EntryId, String>,
}

impl HeadwordIndex {
    pub fn build(entries: &[Entry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.labels.insert(entry.id.clone(), entry.headword.clone());
            index.add_surface(entry.id.as_str(), &entry.id);
            index.add_surface(&entry.headword, &entry.id);
            for alt in &entry.alt_spellings {
                index.add_surface(alt, &entry.id);
            }
        }
        for candidates in index.by_surface.values_mut() {
            candidates.sort();
            candidates.dedup();
        }
        index
    }

    fn add_surface(&mut self, surface: &str, id: &EntryId) {
        let surface = surface.trim();
        if surface.is_empty() {
            return;
        }
        self.by_surface
            .entry(surface.to_string())
            .or_default()
            .push(id.clone());
    }

    /// Resolves a reference surface. Ambiguity prefers the entry whose
    /// canonical id is lexicographically smallest.
    pub fn resolve(&self, surface: &str) -> Resolution {
        match self.by_surface.get(surface.trim()) {
            None => Resolution::Unresolved,
            Some(candidates) => match candidates.as_slice() {
                [] => Resolution::Unresolved,
                [only] => Resolution::Unique(only.clone()),
                [first, ..] => Resolution::Ambiguous {
                    chosen: first.clone(),
                    candidates: candidates.len(),
                },
            },
        }
    }

    /// True if `surface` is carried by at least one entry.
    pub fn knows_surface(&self, surface: &str) -> bool {
        self.by_surface.contains_key(surface.trim())
    }

    /// True if `id` is a known entry id.
    pub fn contains(&self, id: &EntryId) -> bool {
        self.labels.contains_key(id)
    }

    /// The canonical display label of an entry.
    pub fn label(&self, id: &EntryId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Every indexed surface. Iteration order is unspecified; callers that
    /// need determinism must sort.
    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        self.by_surface.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
