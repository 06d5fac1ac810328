//! EntryStore trait for read-only access to the canonical dictionary.
//!
//! The authoring system owns the schema; the pipeline consumes entries
//! through this trait and never writes back. Implementations must be
//! shareable across parallel workers without locking on the read path
//! where possible.

use kosha_types::{Entry, EntryId};
use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;

/// Error type for entry store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The backing storage cannot be opened. Fatal to the whole pipeline:
    /// cross-reference resolution requires global visibility, so no
    /// partial run is attempted without the full entry set.
    #[error("Entry store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row for entry '{id}': {message}")]
    MalformedRow { id: String, message: String },
}

/// Read-only typed access to canonical dictionary entries.
pub trait EntryStore: Send + Sync + Debug {
    /// Fetches every entry, ordered by entry id, stable across runs.
    fn fetch_all(&self) -> Result<Vec<Entry>, StoreError>;

    /// Fetches a single entry by its canonical id.
    fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>, StoreError>;

    /// Returns a human-readable name for this store (for logging).
    fn name(&self) -> &'static str;
}

/// An in-memory entry store.
///
/// Entries are pre-populated before use. This is the simplest store and is
/// what the test suites build their fixtures on.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: BTreeMap<EntryId, Entry>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builds a store from a list of entries. Later duplicates replace
    /// earlier ones, matching upstream authoring semantics.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    pub fn insert(&mut self, entry: Entry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &EntryId) -> Option<Entry> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntryStore for InMemoryEntryStore {
    fn fetch_all(&self) -> Result<Vec<Entry>, StoreError> {
        // BTreeMap iteration is already id-ordered.
        Ok(self.entries.values().cloned().collect())
    }

    fn fetch_by_id(&self, id: &EntryId) -> Result<Option<Entry>, StoreError> {
        Ok(self.entries.get(id).cloned())
    }

    fn name(&self) -> &'static str {
        "InMemoryEntryStore"
    }
}
