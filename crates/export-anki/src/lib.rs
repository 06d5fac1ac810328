//! Flashcard deck exporter.
//!
//! Groups senses into reviewable cards and emits a tab-separated deck
//! (`front`, `back`, `tags`) importable by spaced-repetition tools.
//! Near-identical forms are deduplicated: two cards with the same
//! markup-stripped headword and gloss would review as the same fact, so
//! only the first survives. Oversized fields are truncated with an
//! explicit "see full entry" pointer, never silently dropped.

use kosha_export_core::{
    Artifact, ArtifactFile, ExportError, ExportOutput, Exporter, PackagingConfig,
};
use kosha_idf::{EntryBlock, RenderedEntry};
use kosha_types::{Stage, Warning, WarningKind};
use log::{debug, info};
use std::collections::HashSet;

pub const TARGET: &str = "anki";

/// Flashcard deck exporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnkiExporter;

impl Exporter for AnkiExporter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn export(
        &self,
        entries: &[RenderedEntry],
        config: &PackagingConfig,
    ) -> Result<ExportOutput, ExportError> {
        let deck_name = config
            .deck_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ExportError::new(TARGET, "deck_name is required"))?;

        let mut warnings = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut rows = Vec::new();
        let mut deduped = 0usize;

        for entry in entries {
            let summary = entry
                .blocks
                .iter()
                .find_map(|b| match b {
                    EntryBlock::Summary(spans) => Some(kosha_idf::spans_plain_text(spans)),
                    _ => None,
                })
                .unwrap_or_default();

            for gloss in entry.glosses() {
                if gloss.trim().is_empty() {
                    continue;
                }
                let key = (normalize(&entry.headword), normalize(&gloss));
                if !seen.insert(key) {
                    deduped += 1;
                    continue;
                }

                let front = fit_field(&entry.headword, entry, config, &mut warnings);
                let back_full = if summary.is_empty() {
                    gloss.clone()
                } else {
                    format!("{}<br>{}", gloss, summary)
                };
                let back = fit_field(&back_full, entry, config, &mut warnings);
                let tags = entry.letter.clone();

                rows.push(format!(
                    "{}\t{}\t{}",
                    escape_field(&front),
                    escape_field(&back),
                    escape_field(&tags)
                ));
            }
        }

        if deduped > 0 {
            debug!("[EXPORT:{}] Deduplicated {} near-identical cards", TARGET, deduped);
        }
        info!("[EXPORT:{}] {} cards from {} entries", TARGET, rows.len(), entries.len());

        let mut deck = format!("#deck:{}\n#separator:tab\n", deck_name);
        for row in &rows {
            deck.push_str(row);
            deck.push('\n');
        }

        Ok(ExportOutput {
            artifact: Artifact {
                target: TARGET,
                files: vec![ArtifactFile::new(
                    format!("{}-deck.tsv", config.name),
                    deck.into_bytes(),
                )],
                container: None,
            },
            warnings,
        })
    }
}

/// Dedup key: markup already stripped by the caller; fold case and
/// surrounding whitespace so trivial variants collapse.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Enforces the per-field size limit. Truncation cuts at a char boundary
/// and appends an explicit pointer to the full entry.
fn fit_field(
    text: &str,
    entry: &RenderedEntry,
    config: &PackagingConfig,
    warnings: &mut Vec<Warning>,
) -> String {
    let max = config.max_field_len;
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }

    let marker = format!("… see full entry: {}", entry.headword);
    let keep = max.saturating_sub(marker.chars().count()).max(1);
    let truncated: String = text.chars().take(keep).collect();

    warnings.push(Warning::new(
        Some(entry.id.clone()),
        Stage::Exporting,
        WarningKind::TruncatedField,
        format!(
            "field truncated from {} to {} chars",
            text.chars().count(),
            keep
        ),
    ));

    format!("{}{}", truncated, marker)
}

/// Tabs and newlines are field/record separators in the deck format.
fn escape_field(text: &str) -> String {
    text.replace('\t', " ").replace(['\r', '\n'], "<br>")
}
