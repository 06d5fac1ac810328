//! The canonical lexical data model.
//!
//! `Entry`, `Sense`, and their cross-reference declarations are authored
//! upstream and read-only to the pipeline. `GrammarForm` and
//! `Deconstruction` are pipeline-owned and rebuilt on every run.

use crate::ids::EntryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One headword's canonical record in the dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable canonical key, e.g. `"dhamma 1"`.
    pub id: EntryId,
    /// Display headword with full diacritics.
    pub headword: String,
    /// Alternate spellings and variant readings that must resolve to this entry.
    #[serde(default)]
    pub alt_spellings: Vec<String>,
    pub grammar: GrammarInfo,
    /// Ordered senses; order is meaningful for display.
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub etymology: Option<String>,
    /// Source citations with sutta examples.
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Marks a compound headword eligible for deconstruction.
    #[serde(default)]
    pub compound: bool,
}

/// Grammatical metadata attached to an entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrammarInfo {
    /// Part of speech, e.g. `"masc"`, `"pr"`, `"ind"`.
    pub pos: String,
    /// Free-form grammar tags, e.g. `["nt", "in comps"]`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Name of the inflection class in the rule table. `None` for words
    /// that take no table (particles, indeclinables).
    #[serde(default)]
    pub inflection_class: Option<String>,
    /// Inflectable stem the rule table endings attach to.
    #[serde(default)]
    pub stem: Option<String>,
    /// Morphological construction, e.g. `"dhamma + cakka"`.
    #[serde(default)]
    pub construction: Option<String>,
}

/// One distinct meaning belonging to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    /// Free-text gloss in the target language.
    pub gloss: String,
    /// Literal meaning, where it differs from the gloss in context.
    #[serde(default)]
    pub literal: Option<String>,
    /// Outbound cross-reference declarations.
    #[serde(default)]
    pub refs: Vec<CrossRefDecl>,
}

/// A declared (unresolved) cross-reference: a target headword as written
/// by the editors, not yet checked against the entry store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRefDecl {
    pub target: String,
    pub kind: RelationKind,
}

/// The semantic kind of a cross-reference edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Synonym,
    Antonym,
    Variant,
    SeeAlso,
    DerivedFrom,
    /// Constituent of a compound, produced by the deconstructor.
    Constituent,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Synonym => "synonym",
            RelationKind::Antonym => "antonym",
            RelationKind::Variant => "variant",
            RelationKind::SeeAlso => "see_also",
            RelationKind::DerivedFrom => "derived_from",
            RelationKind::Constituent => "constituent",
        }
    }

    /// Parses the storage representation. Unknown kinds map to `SeeAlso`
    /// so that a schema addition upstream degrades instead of failing the
    /// whole load.
    pub fn parse(s: &str) -> Self {
        match s {
            "synonym" => RelationKind::Synonym,
            "antonym" => RelationKind::Antonym,
            "variant" => RelationKind::Variant,
            "derived_from" => RelationKind::DerivedFrom,
            "constituent" => RelationKind::Constituent,
            _ => RelationKind::SeeAlso,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source citation with its sutta example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub sutta: String,
    pub example: String,
}

/// One inflected or derived surface form, produced by the grammar table
/// builder. Regenerated wholesale on each run; never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarForm {
    pub entry: EntryId,
    pub inflection_class: String,
    /// Ending label from the rule table, e.g. `"nom sg"`.
    pub label: String,
    /// The fully built surface form.
    pub surface: String,
}

/// Decomposition of a compound headword into constituent entries, in
/// surface order. Only ever constructed with every constituent resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deconstruction {
    pub entry: EntryId,
    pub constituents: Vec<EntryId>,
}
