//! Per-item warnings accumulated during a pipeline run.
//!
//! Warnings never unwind a stage. They are collected into the run report
//! with enough identifying context (entry id, stage, reason) to be
//! actionable by an editor without re-running with verbose logging.

use crate::ids::EntryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a warning was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loading,
    Deriving,
    Resolving,
    Rendering,
    Exporting,
    Packaging,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Loading => "loading",
            Stage::Deriving => "deriving",
            Stage::Resolving => "resolving",
            Stage::Rendering => "rendering",
            Stage::Exporting => "exporting",
            Stage::Packaging => "packaging",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a non-fatal, per-item issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An entry's grammar references an inflection class missing from the
    /// rule table; the entry gets zero forms.
    UnknownInflectionClass,
    /// No segmentation of a compound resolved every constituent.
    DeconstructionFailed,
    /// A cross-reference target matched no entry; the link is degraded to
    /// plain text, never followed.
    UnresolvedReference,
    /// A reference matched several entries; resolution took the
    /// lexicographically smallest canonical id.
    AmbiguousReference,
    /// An exporter truncated an oversized field and appended an explicit
    /// pointer to the full entry.
    TruncatedField,
    /// The transliteration service failed; text passed through unchanged.
    TransliterationFailed,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnknownInflectionClass => "unknown_inflection_class",
            WarningKind::DeconstructionFailed => "deconstruction_failed",
            WarningKind::UnresolvedReference => "unresolved_reference",
            WarningKind::AmbiguousReference => "ambiguous_reference",
            WarningKind::TruncatedField => "truncated_field",
            WarningKind::TransliterationFailed => "transliteration_failed",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// The entry the issue belongs to, when one is identifiable.
    pub entry: Option<EntryId>,
    pub stage: Stage,
    pub kind: WarningKind,
    pub detail: String,
}

impl Warning {
    pub fn new(
        entry: impl Into<Option<EntryId>>,
        stage: Stage,
        kind: WarningKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            entry: entry.into(),
            stage,
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(id) => write!(f, "[{}] {} ({}): {}", self.stage, self.kind, id, self.detail),
            None => write!(f, "[{}] {}: {}", self.stage, self.kind, self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_includes_context() {
        let w = Warning::new(
            Some(EntryId::new("dhammacakka")),
            Stage::Deriving,
            WarningKind::DeconstructionFailed,
            "no segmentation resolves every constituent",
        );
        let text = w.to_string();
        assert!(text.contains("deriving"));
        assert!(text.contains("dhammacakka"));
        assert!(text.contains("deconstruction_failed"));
    }
}
