//! Entry rendering into the Intermediate Dictionary Format.
//!
//! Rendering is pure and total: every entry produces exactly one
//! [`RenderedEntry`], even when some inputs are empty. Markup spans are
//! format-neutral tags; no target-format syntax is produced here.

use itertools::Itertools;
use kosha_idf::{EntryBlock, GrammarRow, InlineSpan, MaterializedLink, RenderedEntry};
use kosha_traits::{Scheme, Transliterator};
use kosha_types::alphabet;
use kosha_types::{
    Deconstruction, Entry, GrammarForm, RelationKind, Stage, Warning, WarningKind,
};
use kosha_xref::{HeadwordIndex, LinkSource, Resolution, XrefGraph};
use log::trace;

/// Shared, read-only inputs for rendering one batch of entries.
pub struct RenderContext<'a> {
    pub index: &'a HeadwordIndex,
    pub graph: &'a XrefGraph,
    /// Optional script conversion applied to the headword line. Failure
    /// degrades to the untransformed text plus a warning.
    pub transliterator: Option<(&'a dyn Transliterator, Scheme)>,
}

/// Renders one entry into its format-neutral representation.
///
/// `forms` and `deconstruction` are this entry's own derivation output;
/// resolved outbound links come from the cross-reference graph.
pub fn render_entry(
    entry: &Entry,
    forms: &[GrammarForm],
    deconstruction: Option<&Deconstruction>,
    ctx: &RenderContext<'_>,
) -> (RenderedEntry, Vec<Warning>) {
    let mut rendered = RenderedEntry::new(entry.id.clone(), entry.headword.clone());
    let mut warnings = Vec::new();

    // Outbound links, materialized once with the target's canonical label
    // so no exporter ever re-resolves.
    for edge in ctx.graph.outbound(&entry.id) {
        let label = ctx
            .index
            .label(&edge.target)
            .unwrap_or_else(|| edge.target.as_str())
            .to_string();
        rendered.links.push(MaterializedLink {
            target: edge.target.clone(),
            label,
            kind: edge.kind,
        });
    }

    rendered.blocks.push(summary_block(entry, ctx, &mut warnings));
    rendered.blocks.push(gloss_list_block(entry, ctx));

    if !forms.is_empty() {
        let inflection_class = forms[0].inflection_class.clone();
        rendered.blocks.push(EntryBlock::GrammarTable {
            inflection_class,
            rows: forms
                .iter()
                .map(|f| GrammarRow {
                    label: f.label.clone(),
                    surface: f.surface.clone(),
                })
                .collect(),
        });
    }

    if let Some(deconstruction) = deconstruction {
        rendered
            .blocks
            .push(deconstruction_block(deconstruction, ctx));
    }

    for citation in &entry.citations {
        if citation.example.is_empty() {
            continue;
        }
        let citation_line = [citation.source.as_str(), citation.sutta.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .join(" ");
        rendered.blocks.push(EntryBlock::Example {
            spans: vec![InlineSpan::Text(citation.example.clone())],
            citation: citation_line,
        });
    }

    rendered.lookup_forms = lookup_forms(entry, forms);

    trace!(
        "[RENDER] {}: {} blocks, {} links, {} lookup forms",
        entry.id,
        rendered.blocks.len(),
        rendered.links.len(),
        rendered.lookup_forms.len()
    );

    (rendered, warnings)
}

/// The one-line summary: part of speech, leading gloss, construction.
fn summary_block(entry: &Entry, ctx: &RenderContext<'_>, warnings: &mut Vec<Warning>) -> EntryBlock {
    let mut spans = Vec::new();

    let headword_line = match ctx.transliterator {
        Some((service, scheme)) => match service.transliterate(&entry.headword, scheme) {
            Ok(text) => text,
            Err(err) => {
                warnings.push(Warning::new(
                    Some(entry.id.clone()),
                    Stage::Rendering,
                    WarningKind::TransliterationFailed,
                    format!("{} ({}): {}", service.name(), scheme.as_str(), err),
                ));
                entry.headword.clone()
            }
        },
        None => entry.headword.clone(),
    };
    spans.push(InlineSpan::Emphasis(headword_line));

    if !entry.grammar.pos.is_empty() {
        spans.push(InlineSpan::Text(format!(" {}.", entry.grammar.pos)));
    }

    if let Some(first_sense) = entry.senses.first() {
        spans.push(InlineSpan::Text(format!(" {}", first_sense.gloss)));
    }

    if let Some(construction) = entry
        .grammar
        .construction
        .as_deref()
        .filter(|c| !c.is_empty())
    {
        spans.push(InlineSpan::Text(format!(" [{}]", construction)));
    }

    if entry.grammar.inflection_class.is_some() {
        spans.push(InlineSpan::GrammarRef(entry.headword.clone()));
    }

    EntryBlock::Summary(spans)
}

/// One row of spans per sense, with cross-link spans for resolved
/// references. An unresolved reference keeps its text, loses its link.
fn gloss_list_block(entry: &Entry, ctx: &RenderContext<'_>) -> EntryBlock {
    let mut rows = Vec::with_capacity(entry.senses.len());
    for (position, sense) in entry.senses.iter().enumerate() {
        let mut spans = vec![InlineSpan::Text(sense.gloss.clone())];
        if let Some(literal) = sense.literal.as_deref().filter(|l| !l.is_empty()) {
            spans.push(InlineSpan::Text(format!(" (lit. {})", literal)));
        }

        // The resolver emits this sense's edges in declaration order,
        // skipping unresolved declarations; walking both lists in lockstep
        // re-pairs each edge with its declaration.
        let source = LinkSource::Sense {
            entry: entry.id.clone(),
            position,
        };
        let mut sense_edges = ctx
            .graph
            .outbound(&entry.id)
            .filter(|edge| edge.source == source);
        for decl in &sense.refs {
            spans.push(InlineSpan::Text(format!("; {} ", relation_prefix(decl.kind))));
            match ctx.index.resolve(&decl.target) {
                Resolution::Unique(_) | Resolution::Ambiguous { .. } => {
                    if let Some(edge) = sense_edges.next() {
                        let label = ctx
                            .index
                            .label(&edge.target)
                            .unwrap_or_else(|| edge.target.as_str())
                            .to_string();
                        spans.push(InlineSpan::Link {
                            target: edge.target.clone(),
                            label,
                        });
                    } else {
                        spans.push(InlineSpan::Text(decl.target.clone()));
                    }
                }
                // Unresolved: omit the link, keep the text.
                Resolution::Unresolved => {
                    spans.push(InlineSpan::Text(decl.target.clone()));
                }
            }
        }
        rows.push(spans);
    }
    EntryBlock::GlossList(rows)
}

fn relation_prefix(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Synonym => "syn.",
        RelationKind::Antonym => "opp.",
        RelationKind::Variant => "var.",
        RelationKind::SeeAlso => "see",
        RelationKind::DerivedFrom => "from",
        RelationKind::Constituent => "comp.",
    }
}

/// The constituent line of a compound, e.g. `dhamma + cakka` with each
/// part linked to its own entry.
fn deconstruction_block(deconstruction: &Deconstruction, ctx: &RenderContext<'_>) -> EntryBlock {
    let mut spans = Vec::new();
    for (i, constituent) in deconstruction.constituents.iter().enumerate() {
        if i > 0 {
            spans.push(InlineSpan::Text(" + ".to_string()));
        }
        let label = ctx
            .index
            .label(constituent)
            .unwrap_or_else(|| constituent.as_str())
            .to_string();
        spans.push(InlineSpan::Link {
            target: constituent.clone(),
            label,
        });
    }
    EntryBlock::Deconstruction(spans)
}

/// Every surface a reader may look this entry up by. Sorted and deduped
/// so exporter output stays deterministic.
fn lookup_forms(entry: &Entry, forms: &[GrammarForm]) -> Vec<String> {
    let mut surfaces: Vec<String> = Vec::new();
    surfaces.extend(entry.alt_spellings.iter().cloned());
    surfaces.extend(forms.iter().map(|f| f.surface.clone()));
    let clean = alphabet::strip_diacritics(&entry.headword);
    if clean != entry.headword {
        surfaces.push(clean);
    }
    surfaces.retain(|s| !s.is_empty() && s != &entry.headword);
    surfaces.sort();
    surfaces.dedup();
    surfaces
}
