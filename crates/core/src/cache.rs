//! Content-hash-keyed derivation caches.
//!
//! Grammar forms and rendered entries may be cached across runs to skip
//! recomputation when inputs are unchanged. Hits are verified against the
//! content hash, never trusted by id alone: entry content can change
//! without the id changing, and a stale hit would silently corrupt an
//! export.

use kosha_types::{Entry, EntryId};
use serde::Serialize;
use std::collections::HashMap;

/// A blake3 digest of a derivation's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hashes an entry plus the rule-table version (the two inputs of
    /// grammar derivation). Serialization through serde_json keeps the
    /// byte stream stable across field reorderings in memory.
    pub fn of_entry(entry: &Entry, rule_version: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(rule_version.as_bytes());
        hasher.update(&[0]);
        hash_value(&mut hasher, entry);
        Self(*hasher.finalize().as_bytes())
    }

    /// Hashes an entry plus everything else rendering reads: the rule
    /// version (which determines its forms) and its resolved outbound
    /// edges. A change in any linked target invalidates the rendered
    /// entry even though the entry's own content is unchanged.
    pub fn of_render_inputs(
        entry: &Entry,
        rule_version: &str,
        outbound: impl Iterator<Item = (EntryId, String)>,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(rule_version.as_bytes());
        hasher.update(&[0]);
        hash_value(&mut hasher, entry);
        for (target, label) in outbound {
            hasher.update(&[1]);
            hasher.update(target.as_str().as_bytes());
            hasher.update(&[2]);
            hasher.update(label.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn hash_value<T: Serialize>(hasher: &mut blake3::Hasher, value: &T) {
    // Infallible for our plain data types; an unserializable value would
    // be a programming error caught by every test that touches the cache.
    if let Ok(bytes) = serde_json::to_vec(value) {
        hasher.update(&bytes);
    }
}

/// A cache of derivation output keyed by entry id and verified by hash.
#[derive(Debug, Default)]
pub struct DerivationCache<T> {
    slots: HashMap<EntryId, (ContentHash, T)>,
    hits: usize,
    misses: usize,
}

impl<T: Clone> DerivationCache<T> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached value only when the stored hash matches the
    /// hash of the current inputs.
    pub fn get_verified(&mut self, id: &EntryId, hash: &ContentHash) -> Option<T> {
        match self.slots.get(id) {
            Some((stored, value)) if stored == hash => {
                self.hits += 1;
                Some(value.clone())
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, id: EntryId, hash: ContentHash, value: T) {
        self.slots.insert(id, (hash, value));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// (hits, misses) since construction, for the run report.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
