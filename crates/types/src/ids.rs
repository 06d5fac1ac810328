//! Newtype wrappers for semantic identifiers.
//!
//! These types provide compile-time type safety to prevent mixing up
//! different kinds of string identifiers (entry ids, lookup surfaces, etc.).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The stable canonical key of a dictionary entry.
///
/// An `EntryId` is the headword plus a homonym ordinal where needed
/// (e.g. `"dhamma 1"`). It is immutable once assigned upstream and is the
/// join key across every derived table in the pipeline. Spelling variants
/// never change the id.
///
/// `Ord` is derived so that ambiguity tie-breaks (resolve to the
/// lexicographically smallest canonical id) are deterministic.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntryId(Arc<str>);

impl EntryId {
    /// Creates a new EntryId from a string.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this entry id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EntryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s.into()))
    }
}
