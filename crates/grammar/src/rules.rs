//! The external morphological rule table.
//!
//! Loaded once per run from versioned JSON and treated as immutable for
//! the run's duration. The version string participates in derivation
//! cache keys, so bumping the table invalidates every cached form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for rule table loading.
#[derive(Error, Debug)]
pub enum RuleTableError {
    #[error("Failed to read rule table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rule table has an empty version string")]
    MissingVersion,
}

/// One ending of an inflection class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    /// Grammatical label, e.g. `"nom sg"`.
    pub label: String,
    /// Suffix appended to the stem. May be empty for bare-stem forms.
    #[serde(default)]
    pub suffix: String,
}

/// A named inflection class: the ordered endings applied to a stem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InflectionClass {
    pub endings: Vec<Ending>,
}

/// The versioned rule table.
///
/// Classes live in a `BTreeMap` so that serialization and iteration are
/// deterministic regardless of authoring order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub version: String,
    pub classes: BTreeMap<String, InflectionClass>,
}

impl RuleTable {
    /// An empty table with a sentinel version, for runs that skip grammar
    /// derivation entirely.
    pub fn empty() -> Self {
        Self {
            version: "empty".to_string(),
            classes: BTreeMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleTableError> {
        let table: RuleTable = serde_json::from_str(json)?;
        if table.version.trim().is_empty() {
            return Err(RuleTableError::MissingVersion);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleTableError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RuleTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn class(&self, name: &str) -> Option<&InflectionClass> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
