//! The structured run report.
//!
//! Emitted at the end of every run regardless of success or failure, for
//! operational monitoring of dictionary-build health over time. The
//! report is the one place wall-clock timestamps are allowed; artifact
//! bytes must stay reproducible.

use chrono::{DateTime, Utc};
use kosha_types::Warning;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Size and shape of one exported artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub target: String,
    /// Container archive name for multi-file targets.
    pub container: Option<String>,
    pub files: usize,
    pub bytes: usize,
}

/// One export target that failed and was excluded from the release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTarget {
    pub target: String,
    pub cause: String,
}

/// The complete record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Terminal state: `"done"` or `"failed(<stage>)"`.
    pub final_state: String,
    pub entries_loaded: usize,
    pub grammar_forms: usize,
    pub deconstructions: usize,
    pub deconstruction_errors: usize,
    pub xref_edges: usize,
    pub rendered_entries: usize,
    /// Entries surviving the export filter (equals `rendered_entries` for
    /// a full export).
    pub exported_entries: usize,
    pub warnings_by_kind: BTreeMap<String, usize>,
    pub warnings: Vec<Warning>,
    pub artifacts: Vec<ArtifactSummary>,
    pub failed_targets: Vec<FailedTarget>,
    /// (hits, misses) of the derivation caches, when caching is enabled.
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl RunReport {
    pub(crate) fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            final_state: "idle".to_string(),
            entries_loaded: 0,
            grammar_forms: 0,
            deconstructions: 0,
            deconstruction_errors: 0,
            xref_edges: 0,
            rendered_entries: 0,
            exported_entries: 0,
            warnings_by_kind: BTreeMap::new(),
            warnings: Vec::new(),
            artifacts: Vec::new(),
            failed_targets: Vec::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Folds the drained warnings in. Sorted by (entry, stage, kind) so
    /// reports diff cleanly between runs despite concurrent collection.
    pub(crate) fn finish(&mut self, final_state: String, mut warnings: Vec<Warning>) {
        warnings.sort_by(|a, b| {
            a.entry
                .cmp(&b.entry)
                .then(a.stage.as_str().cmp(b.stage.as_str()))
                .then(a.kind.cmp(&b.kind))
                .then(a.detail.cmp(&b.detail))
        });
        for warning in &warnings {
            *self
                .warnings_by_kind
                .entry(warning.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        self.warnings = warnings;
        self.final_state = final_state;
        self.finished_at = Utc::now();
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
