//! Intermediate Dictionary Format (IDF)
//! This crate defines the format-neutral, in-memory representation of a
//! fully resolved dictionary entry after rendering but before export.
//!
//! The separation is deliberate: markup spans are typed tags, not raw
//! target-format syntax, so adding a new export target never requires
//! re-deriving grammar or cross-reference data — only a new leaf
//! transformation from [`RenderedEntry`] to target bytes. Target-specific
//! escaping is each exporter's own concern.

use kosha_types::alphabet;
use kosha_types::{EntryId, RelationKind};
use serde::{Deserialize, Serialize};

/// The rendered, format-neutral representation of one entry.
///
/// Rendering is pure and total: every entry produces exactly one
/// `RenderedEntry`, even when some inputs are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedEntry {
    pub id: EntryId,
    pub headword: String,
    /// The alphabet unit this entry files under, e.g. `"kh"`. Entries whose
    /// headword starts outside the Pali alphabet file under `"*"`.
    pub letter: String,
    /// Pali collation key, precomputed so exporters never re-derive it.
    pub sort_key: Vec<u32>,
    /// Display content in fixed block order.
    pub blocks: Vec<EntryBlock>,
    /// Materialized outbound links: target id plus the target's canonical
    /// display label, captured at render time to avoid re-resolution in
    /// every exporter.
    pub links: Vec<MaterializedLink>,
    /// Every surface a reader may look this entry up by: alternate
    /// spellings, inflected forms, and the diacritic-stripped headword.
    pub lookup_forms: Vec<String>,
}

impl RenderedEntry {
    /// Letter group for headwords outside the Pali alphabet.
    pub const FOREIGN_LETTER: &'static str = "*";

    pub fn new(id: EntryId, headword: impl Into<String>) -> Self {
        let headword = headword.into();
        let letter = alphabet::first_letter(&headword)
            .unwrap_or(Self::FOREIGN_LETTER)
            .to_string();
        let sort_key = alphabet::sort_key(&headword);
        Self {
            id,
            headword,
            letter,
            sort_key,
            blocks: Vec::new(),
            links: Vec::new(),
            lookup_forms: Vec::new(),
        }
    }

    /// Concatenated plain text of all blocks, markup stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            let text = block.plain_text();
            if !text.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&text);
            }
        }
        out
    }

    /// The gloss rows of the first `GlossList` block, markup stripped.
    /// Exporters use this for per-sense output without walking blocks.
    pub fn glosses(&self) -> Vec<String> {
        for block in &self.blocks {
            if let EntryBlock::GlossList(rows) = block {
                return rows.iter().map(|spans| spans_plain_text(spans)).collect();
            }
        }
        Vec::new()
    }
}

/// A block-level element of a rendered entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryBlock {
    /// One-line summary: part of speech, leading gloss, construction.
    Summary(Vec<InlineSpan>),
    /// The ordered senses, one row of spans per sense.
    GlossList(Vec<Vec<InlineSpan>>),
    /// Inflected forms grouped under their inflection class.
    GrammarTable {
        inflection_class: String,
        rows: Vec<GrammarRow>,
    },
    /// Constituent breakdown of a compound headword.
    Deconstruction(Vec<InlineSpan>),
    /// A sutta example with its citation line.
    Example {
        spans: Vec<InlineSpan>,
        citation: String,
    },
}

impl EntryBlock {
    /// Returns a string identifier for the block type, used for logging
    /// and exporter dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryBlock::Summary(_) => "summary",
            EntryBlock::GlossList(_) => "gloss-list",
            EntryBlock::GrammarTable { .. } => "grammar-table",
            EntryBlock::Deconstruction(_) => "deconstruction",
            EntryBlock::Example { .. } => "example",
        }
    }

    /// Plain text of this block with all markup stripped.
    pub fn plain_text(&self) -> String {
        match self {
            EntryBlock::Summary(spans) | EntryBlock::Deconstruction(spans) => {
                spans_plain_text(spans)
            }
            EntryBlock::GlossList(rows) => rows
                .iter()
                .map(|spans| spans_plain_text(spans))
                .collect::<Vec<_>>()
                .join("; "),
            EntryBlock::GrammarTable { rows, .. } => rows
                .iter()
                .map(|r| format!("{} {}", r.label, r.surface))
                .collect::<Vec<_>>()
                .join(", "),
            EntryBlock::Example { spans, citation } => {
                let text = spans_plain_text(spans);
                if citation.is_empty() {
                    text
                } else {
                    format!("{} ({})", text, citation)
                }
            }
        }
    }
}

/// One row of a grammar table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRow {
    pub label: String,
    pub surface: String,
}

/// An inline span within a block. Tags are format-neutral; exporters map
/// them onto their own markup dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InlineSpan {
    Text(String),
    Emphasis(String),
    /// A resolved cross-link. `label` is the target's canonical headword.
    Link { target: EntryId, label: String },
    /// A reference to the entry's own grammar table.
    GrammarRef(String),
}

impl InlineSpan {
    pub fn plain_text(&self) -> &str {
        match self {
            InlineSpan::Text(s) | InlineSpan::Emphasis(s) | InlineSpan::GrammarRef(s) => s,
            InlineSpan::Link { label, .. } => label,
        }
    }
}

/// Strips markup from a span run.
pub fn spans_plain_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::plain_text).collect()
}

/// A materialized outbound link of a rendered entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedLink {
    pub target: EntryId,
    /// The target's canonical display label at render time.
    pub label: String,
    pub kind: RelationKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_files_under_its_letter() {
        let entry = RenderedEntry::new(EntryId::new("khanti"), "khanti");
        assert_eq!(entry.letter, "kh");
        assert!(!entry.sort_key.is_empty());
    }

    #[test]
    fn headword_outside_alphabet_files_under_foreign() {
        let entry = RenderedEntry::new(EntryId::new("42"), "42");
        assert_eq!(entry.letter, RenderedEntry::FOREIGN_LETTER);
    }

    #[test]
    fn plain_text_strips_markup() {
        let spans = vec![
            InlineSpan::Text("the ".into()),
            InlineSpan::Link {
                target: EntryId::new("cakka 1"),
                label: "cakka".into(),
            },
            InlineSpan::Emphasis(" wheel".into()),
        ];
        assert_eq!(spans_plain_text(&spans), "the cakka wheel");
    }

    #[test]
    fn glosses_returns_rows_in_sense_order() {
        let mut entry = RenderedEntry::new(EntryId::new("dhamma 1"), "dhamma");
        entry.blocks.push(EntryBlock::GlossList(vec![
            vec![InlineSpan::Text("law".into())],
            vec![InlineSpan::Text("teaching".into())],
        ]));
        assert_eq!(entry.glosses(), vec!["law", "teaching"]);
    }
}
