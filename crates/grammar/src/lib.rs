//! Grammar table derivation.
//!
//! Expands each entry's morphological metadata into fully inflected
//! surface forms using an external, versioned rule table. The output is a
//! rebuildable cache: regenerated wholesale on every run, never mutated
//! incrementally, and byte-identical across runs for the same inputs.

pub mod rules;

pub use rules::{Ending, InflectionClass, RuleTable, RuleTableError};

use kosha_types::{Entry, GrammarForm, Stage, Warning, WarningKind};
use log::trace;

/// Stem value marking an uninflectable word in the authoring data.
const UNINFLECTED_STEM: &str = "-";

/// Builds every inflected form of one entry.
///
/// Deterministic: forms come out in rule-table declaration order, so the
/// same entry and table always produce the same byte sequence (required
/// for incremental re-export and for derivation cache keys).
///
/// An unknown inflection class yields zero forms plus a warning; it never
/// aborts the stage. Entries without a class or with an uninflectable stem
/// yield zero forms silently.
pub fn build_forms(entry: &Entry, table: &RuleTable) -> (Vec<GrammarForm>, Vec<Warning>) {
    let Some(class_name) = entry.grammar.inflection_class.as_deref() else {
        return (Vec::new(), Vec::new());
    };

    let stem = match entry.grammar.stem.as_deref() {
        None | Some("") | Some(UNINFLECTED_STEM) => {
            trace!("[DERIVE] {}: uninflectable stem, no forms", entry.id);
            return (Vec::new(), Vec::new());
        }
        Some(stem) => stem,
    };

    let Some(class) = table.class(class_name) else {
        let warning = Warning::new(
            Some(entry.id.clone()),
            Stage::Deriving,
            WarningKind::UnknownInflectionClass,
            format!(
                "inflection class '{}' not in rule table {}",
                class_name, table.version
            ),
        );
        return (Vec::new(), vec![warning]);
    };

    let forms = class
        .endings
        .iter()
        .map(|ending| GrammarForm {
            entry: entry.id.clone(),
            inflection_class: class_name.to_string(),
            label: ending.label.clone(),
            surface: format!("{}{}", stem, ending.suffix),
        })
        .collect();

    (forms, Vec::new())
}
