//! Compound headword deconstruction.
//!
//! Decomposes a compound headword into an ordered sequence of constituent
//! entries by longest-match-first segmentation against the known headword
//! surfaces, then verifies that every candidate resolves to an existing
//! entry id. If no segmentation resolves every constituent the whole
//! decomposition is rejected: a partial decomposition corrupts downstream
//! cross-reference counts, so it is judged worse than none.

use kosha_types::{Deconstruction, Entry, EntryId, Stage, Warning, WarningKind};
use kosha_xref::{HeadwordIndex, Resolution};
use log::trace;
use thiserror::Error;

/// Rejection of a compound's decomposition.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Deconstruction of '{entry_id}' failed: {reason}")]
pub struct DeconstructionError {
    pub entry_id: EntryId,
    pub reason: String,
}

/// Deconstructs one compound entry.
///
/// On success the warnings carry any ambiguity tie-breaks taken while
/// resolving constituents; they accompany the result rather than blocking
/// it. Entries not flagged compound are an upstream contract violation and
/// come back as an error.
pub fn deconstruct(
    entry: &Entry,
    index: &HeadwordIndex,
) -> Result<(Deconstruction, Vec<Warning>), DeconstructionError> {
    if !entry.compound {
        return Err(DeconstructionError {
            entry_id: entry.id.clone(),
            reason: "entry is not flagged as a compound".to_string(),
        });
    }

    let word = entry.headword.as_str();
    let mut segments = Vec::new();
    if !segment(word, word, index, &mut segments) {
        return Err(DeconstructionError {
            entry_id: entry.id.clone(),
            reason: format!("no segmentation of '{}' resolves every constituent", word),
        });
    }

    trace!("[DERIVE] {} segments as {:?}", entry.id, segments);

    let mut constituents = Vec::with_capacity(segments.len());
    let mut warnings = Vec::new();
    for surface in &segments {
        match index.resolve(surface) {
            Resolution::Unique(id) => constituents.push(id),
            Resolution::Ambiguous { chosen, candidates } => {
                warnings.push(Warning::new(
                    Some(entry.id.clone()),
                    Stage::Deriving,
                    WarningKind::AmbiguousReference,
                    format!(
                        "constituent '{}' matches {} entries; resolved to '{}'",
                        surface, candidates, chosen
                    ),
                ));
                constituents.push(chosen);
            }
            // segment() only proposed known surfaces.
            Resolution::Unresolved => {
                return Err(DeconstructionError {
                    entry_id: entry.id.clone(),
                    reason: format!("constituent '{}' vanished during resolution", surface),
                });
            }
        }
    }

    Ok((
        Deconstruction {
            entry: entry.id.clone(),
            constituents,
        },
        warnings,
    ))
}

/// Longest-match-first segmentation with backtracking.
///
/// At each position the longest known surface is tried first; on a dead
/// end the next shorter match is tried. The compound's own full headword
/// is never accepted as a single "constituent" of itself.
fn segment(
    whole: &str,
    rest: &str,
    index: &HeadwordIndex,
    out: &mut Vec<String>,
) -> bool {
    if rest.is_empty() {
        // A decomposition needs at least two parts.
        return out.len() >= 2;
    }

    let char_ends: Vec<usize> = rest
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .collect();

    for &end in char_ends.iter().rev() {
        let candidate = &rest[..end];
        if candidate == whole {
            continue;
        }
        if !index.knows_surface(candidate) {
            continue;
        }
        out.push(candidate.to_string());
        if segment(whole, &rest[end..], index, out) {
            return true;
        }
        out.pop();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use kosha_types::GrammarInfo;

    fn entry(id: &str, headword: &str, compound: bool) -> Entry {
        Entry {
            id: EntryId::new(id),
            headword: headword.to_string(),
            alt_spellings: Vec::new(),
            grammar: GrammarInfo::default(),
            senses: Vec::new(),
            etymology: None,
            citations: Vec::new(),
            compound,
        }
    }

    fn index_of(entries: &[Entry]) -> HeadwordIndex {
        HeadwordIndex::build(entries)
    }

    #[test]
    fn decomposes_two_part_compound() {
        let entries = vec![
            entry("dhamma 1", "dhamma", false),
            entry("cakka 1", "cakka", false),
            entry("dhammacakka", "dhammacakka", true),
        ];
        let index = index_of(&entries);
        let (result, warnings) = deconstruct(&entries[2], &index).unwrap();
        assert!(warnings.is_empty());
        let ids: Vec<_> = result.constituents.iter().map(|c| c.as_str().to_string()).collect();
        assert_eq!(ids, vec!["dhamma 1", "cakka 1"]);
    }

    #[test]
    fn missing_constituent_rejects_whole_decomposition() {
        // cakka deleted from the store: dhammacakka must fail, not come
        // back as a 1-element decomposition.
        let entries = vec![
            entry("dhamma 1", "dhamma", false),
            entry("dhammacakka", "dhammacakka", true),
        ];
        let index = index_of(&entries);
        let err = deconstruct(&entries[1], &index).unwrap_err();
        assert_eq!(err.entry_id, EntryId::new("dhammacakka"));
        assert!(err.reason.contains("dhammacakka"));
    }

    #[test]
    fn longest_match_wins_when_it_resolves() {
        let entries = vec![
            entry("dhamma 1", "dhamma", false),
            entry("dhammacakka", "dhammacakka", false),
            entry("cakka 1", "cakka", false),
            entry("vattana", "vattana", false),
            entry("dhammacakkavattana", "dhammacakkavattana", true),
        ];
        let index = index_of(&entries);
        let (result, _) = deconstruct(&entries[4], &index).unwrap();
        let ids: Vec<_> = result.constituents.iter().map(|c| c.as_str().to_string()).collect();
        assert_eq!(ids, vec!["dhammacakka", "vattana"]);
    }

    #[test]
    fn backtracks_past_greedy_dead_end() {
        // The greedy pick "mahāsa" strands the remainder "tta"; the
        // segmenter must fall back to "mahā" + "satta".
        let entries = vec![
            entry("mahāsa", "mahāsa", false),
            entry("mahā", "mahā", false),
            entry("satta 1", "satta", false),
            entry("mahāsatta", "mahāsatta", true),
        ];
        let index = index_of(&entries);
        let (result, _) = deconstruct(&entries[3], &index).unwrap();
        let ids: Vec<_> = result.constituents.iter().map(|c| c.as_str().to_string()).collect();
        assert_eq!(ids, vec!["mahā", "satta 1"]);
    }

    #[test]
    fn whole_word_is_not_its_own_constituent() {
        let entries = vec![entry("saṃsāra", "saṃsāra", true)];
        let index = index_of(&entries);
        assert!(deconstruct(&entries[0], &index).is_err());
    }

    #[test]
    fn non_compound_entry_is_rejected() {
        let entries = vec![entry("dhamma 1", "dhamma", false)];
        let index = index_of(&entries);
        assert!(deconstruct(&entries[0], &index).is_err());
    }

    #[test]
    fn ambiguous_constituent_resolves_with_warning() {
        let entries = vec![
            entry("nibbāna 1", "nibbāna", false),
            entry("nibbāna 2", "nibbāna", false),
            entry("gata", "gata", false),
            entry("nibbānagata", "nibbānagata", true),
        ];
        let index = index_of(&entries);
        let (result, warnings) = deconstruct(&entries[3], &index).unwrap();
        assert_eq!(result.constituents[0], EntryId::new("nibbāna 1"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::AmbiguousReference);
    }
}
