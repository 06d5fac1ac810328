//! Cross-reference graph construction.

use crate::index::{HeadwordIndex, Resolution};
use kosha_types::{Deconstruction, Entry, EntryId, RelationKind, Stage, Warning, WarningKind};
use log::debug;
use std::collections::HashMap;

/// The origin of a cross-reference edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkSource {
    Entry(EntryId),
    Sense { entry: EntryId, position: usize },
}

impl LinkSource {
    pub fn entry_id(&self) -> &EntryId {
        match self {
            LinkSource::Entry(id) => id,
            LinkSource::Sense { entry, .. } => entry,
        }
    }
}

/// A fully resolved cross-reference edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEdge {
    pub source: LinkSource,
    pub target: EntryId,
    pub kind: RelationKind,
}

/// The complete directed graph of resolved cross-references.
#[derive(Debug, Default)]
pub struct XrefGraph {
    edges: Vec<ResolvedEdge>,
    by_source_entry: HashMap<EntryId, Vec<usize>>,
}

impl XrefGraph {
    fn push(&mut self, edge: ResolvedEdge) {
        let index = self.edges.len();
        self.by_source_entry
            .entry(edge.source.entry_id().clone())
            .or_default()
            .push(index);
        self.edges.push(edge);
    }

    pub fn edges(&self) -> &[ResolvedEdge] {
        &self.edges
    }

    /// All outbound edges of an entry (entry-level and sense-level), in
    /// declaration order.
    pub fn outbound(&self, entry: &EntryId) -> impl Iterator<Item = &ResolvedEdge> {
        self.by_source_entry
            .get(entry)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Resolves every declared reference from senses and every constituent
/// link from deconstructions into one graph.
///
/// Never fails: unresolved references become warnings and the edge is
/// dropped (collected, never followed); ambiguous references resolve to
/// the lexicographically smallest canonical id with a recorded warning.
pub fn resolve_references(
    entries: &[Entry],
    deconstructions: &[Deconstruction],
    index: &HeadwordIndex,
) -> (XrefGraph, Vec<Warning>) {
    let mut graph = XrefGraph::default();
    let mut warnings = Vec::new();

    for entry in entries {
        for (position, sense) in entry.senses.iter().enumerate() {
            for decl in &sense.refs {
                let source = LinkSource::Sense {
                    entry: entry.id.clone(),
                    position,
                };
                match index.resolve(&decl.target) {
                    Resolution::Unique(target) => {
                        graph.push(ResolvedEdge {
                            source,
                            target,
                            kind: decl.kind,
                        });
                    }
                    Resolution::Ambiguous { chosen, candidates } => {
                        warnings.push(Warning::new(
                            Some(entry.id.clone()),
                            Stage::Resolving,
                            WarningKind::AmbiguousReference,
                            format!(
                                "reference '{}' matches {} entries; resolved to '{}'",
                                decl.target, candidates, chosen
                            ),
                        ));
                        graph.push(ResolvedEdge {
                            source,
                            target: chosen,
                            kind: decl.kind,
                        });
                    }
                    Resolution::Unresolved => {
                        warnings.push(Warning::new(
                            Some(entry.id.clone()),
                            Stage::Resolving,
                            WarningKind::UnresolvedReference,
                            format!("sense {}: reference '{}' matches no entry", position + 1, decl.target),
                        ));
                    }
                }
            }
        }
    }

    // Deconstructions arrive with constituents already verified against the
    // store; re-check here so a stale deconstruction can never smuggle a
    // dangling edge into the graph.
    for deconstruction in deconstructions {
        for constituent in &deconstruction.constituents {
            if index.contains(constituent) {
                graph.push(ResolvedEdge {
                    source: LinkSource::Entry(deconstruction.entry.clone()),
                    target: constituent.clone(),
                    kind: RelationKind::Constituent,
                });
            } else {
                warnings.push(Warning::new(
                    Some(deconstruction.entry.clone()),
                    Stage::Resolving,
                    WarningKind::UnresolvedReference,
                    format!("constituent '{}' no longer exists", constituent),
                ));
            }
        }
    }

    debug!(
        "[RESOLVE] {} edges, {} warnings from {} entries and {} deconstructions",
        graph.len(),
        warnings.len(),
        entries.len(),
        deconstructions.len()
    );

    (graph, warnings)
}
