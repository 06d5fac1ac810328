//! StarDict dictionary-reader exporter.
//!
//! Emits the four-file StarDict package offline readers consume:
//!
//! - `.dict` — concatenated article bodies (`sametypesequence=m`)
//! - `.idx`  — sorted key index: word, NUL, big-endian offset and size
//! - `.syn`  — synonym index mapping every alternate lookup form to its
//!   article's position in the `.idx`
//! - `.ifo`  — plain-text metadata header
//!
//! One record per headword; every spelling variant and inflected form is
//! indexed to the same record through the `.syn` file, giving readers
//! exact-match lookup by any variant.

use kosha_export_core::{
    Artifact, ArtifactFile, ExportError, ExportOutput, Exporter, PackagingConfig,
};
use kosha_idf::RenderedEntry;
use log::info;
use std::collections::BTreeMap;

pub const TARGET: &str = "stardict";

/// StarDict package exporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct StarDictExporter;

impl Exporter for StarDictExporter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn export(
        &self,
        entries: &[RenderedEntry],
        config: &PackagingConfig,
    ) -> Result<ExportOutput, ExportError> {
        if config.title.trim().is_empty() {
            return Err(ExportError::new(TARGET, "bookname (title) is required"));
        }

        // One record per entry, keyed by its display headword. Homonyms
        // produce duplicate keys, which the format permits; readers list
        // both records. Ties sort by canonical id so homonym order is
        // stable across runs.
        let mut sorted: Vec<&RenderedEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| stardict_cmp(key_of(a), key_of(b)).then(a.id.cmp(&b.id)));

        let mut dict = Vec::new();
        let mut idx = Vec::new();
        let mut index_position: BTreeMap<&str, u32> = BTreeMap::new();

        for (position, entry) in sorted.iter().enumerate() {
            let article = entry.plain_text();
            let offset = dict.len() as u32;
            dict.extend_from_slice(article.as_bytes());
            let size = article.len() as u32;

            idx.extend_from_slice(key_of(entry).as_bytes());
            idx.push(0);
            idx.extend_from_slice(&offset.to_be_bytes());
            idx.extend_from_slice(&size.to_be_bytes());

            index_position.insert(entry.id.as_str(), position as u32);
        }

        // Synonym index: every lookup form points at its record. Sorted
        // with the same comparator as the main index.
        let mut syn_pairs: Vec<(&str, u32)> = Vec::new();
        for entry in &sorted {
            let position = index_position[entry.id.as_str()];
            for form in &entry.lookup_forms {
                if form.as_str() == key_of(entry) {
                    continue;
                }
                syn_pairs.push((form.as_str(), position));
            }
        }
        syn_pairs.sort_by(|a, b| stardict_cmp(a.0, b.0).then(a.1.cmp(&b.1)));
        syn_pairs.dedup();

        let mut syn = Vec::new();
        for (form, position) in &syn_pairs {
            syn.extend_from_slice(form.as_bytes());
            syn.push(0);
            syn.extend_from_slice(&position.to_be_bytes());
        }

        let ifo = format!(
            "StarDict's dict ifo file\nversion=3.0.0\nbookname={}\nwordcount={}\nsynwordcount={}\nidxfilesize={}\nsametypesequence=m\ndate={}\n",
            config.title,
            sorted.len(),
            syn_pairs.len(),
            idx.len(),
            config.build_date,
        );

        info!(
            "[EXPORT:{}] {} records, {} synonym forms, {} article bytes",
            TARGET,
            sorted.len(),
            syn_pairs.len(),
            dict.len()
        );

        let base = &config.name;
        Ok(ExportOutput {
            artifact: Artifact {
                target: TARGET,
                files: vec![
                    ArtifactFile::new(format!("{base}.ifo"), ifo.into_bytes()),
                    ArtifactFile::new(format!("{base}.idx"), idx),
                    ArtifactFile::new(format!("{base}.syn"), syn),
                    ArtifactFile::new(format!("{base}.dict"), dict),
                ],
                container: Some(format!("{base}-stardict.zip")),
            },
            warnings: Vec::new(),
        })
    }
}

fn key_of(entry: &RenderedEntry) -> &str {
    &entry.headword
}

/// The index ordering StarDict readers binary-search with:
/// ASCII-case-insensitive byte comparison, ties broken case-sensitively.
fn stardict_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let lowered = a
        .bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()));
    lowered.then_with(|| a.bytes().cmp(b.bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kosha_idf::{EntryBlock, InlineSpan};
    use kosha_types::EntryId;

    fn rendered(id: &str, headword: &str, gloss: &str, forms: &[&str]) -> RenderedEntry {
        let mut entry = RenderedEntry::new(EntryId::new(id), headword);
        entry.blocks.push(EntryBlock::GlossList(vec![vec![
            InlineSpan::Text(gloss.to_string()),
        ]]));
        entry.lookup_forms = forms.iter().map(|s| s.to_string()).collect();
        entry
    }

    /// Parses an idx blob back into (key, offset, size) triples.
    fn parse_idx(idx: &[u8]) -> Vec<(String, u32, u32)> {
        let mut out = Vec::new();
        let mut rest = idx;
        while !rest.is_empty() {
            let nul = rest.iter().position(|&b| b == 0).unwrap();
            let key = String::from_utf8(rest[..nul].to_vec()).unwrap();
            let offset = u32::from_be_bytes(rest[nul + 1..nul + 5].try_into().unwrap());
            let size = u32::from_be_bytes(rest[nul + 5..nul + 9].try_into().unwrap());
            out.push((key, offset, size));
            rest = &rest[nul + 9..];
        }
        out
    }

    #[test]
    fn one_record_per_headword_with_glosses_in_order() {
        let mut entry = rendered("dhamma", "dhamma", "law", &[]);
        if let EntryBlock::GlossList(rows) = &mut entry.blocks[0] {
            rows.push(vec![InlineSpan::Text("teaching".to_string())]);
        }
        let output = StarDictExporter
            .export(&[entry], &PackagingConfig::default())
            .unwrap();

        let idx = parse_idx(&output.artifact.files[1].bytes);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx[0].0, "dhamma");

        let dict = &output.artifact.files[3].bytes;
        let (_, offset, size) = idx[0];
        let article =
            std::str::from_utf8(&dict[offset as usize..(offset + size) as usize]).unwrap();
        assert_eq!(article, "law; teaching");
    }

    #[test]
    fn index_is_sorted_by_stardict_order() {
        let entries = vec![
            rendered("dhamma", "dhamma", "law", &[]),
            rendered("Cakka", "Cakka", "wheel", &[]),
            rendered("aggi", "aggi", "fire", &[]),
        ];
        let output = StarDictExporter
            .export(&entries, &PackagingConfig::default())
            .unwrap();
        let keys: Vec<String> = parse_idx(&output.artifact.files[1].bytes)
            .into_iter()
            .map(|(k, _, _)| k)
            .collect();
        assert_eq!(keys, vec!["aggi", "Cakka", "dhamma"]);
    }

    #[test]
    fn every_lookup_form_lands_in_syn() {
        let entries = vec![rendered(
            "nibbāna",
            "nibbāna",
            "extinction",
            &["nibbana", "nibbānaṃ"],
        )];
        let output = StarDictExporter
            .export(&entries, &PackagingConfig::default())
            .unwrap();
        let syn = &output.artifact.files[2].bytes;

        let mut forms = Vec::new();
        let mut rest = &syn[..];
        while !rest.is_empty() {
            let nul = rest.iter().position(|&b| b == 0).unwrap();
            forms.push(String::from_utf8(rest[..nul].to_vec()).unwrap());
            let position = u32::from_be_bytes(rest[nul + 1..nul + 5].try_into().unwrap());
            assert_eq!(position, 0);
            rest = &rest[nul + 5..];
        }
        assert_eq!(forms.len(), 2);
        assert!(forms.contains(&"nibbana".to_string()));
        assert!(forms.contains(&"nibbānaṃ".to_string()));
    }

    #[test]
    fn ifo_counts_match_payload() {
        let entries = vec![
            rendered("a", "a", "x", &["aa"]),
            rendered("b", "b", "y", &[]),
        ];
        let output = StarDictExporter
            .export(&entries, &PackagingConfig::default())
            .unwrap();
        let ifo = String::from_utf8(output.artifact.files[0].bytes.clone()).unwrap();
        assert!(ifo.contains("wordcount=2"));
        assert!(ifo.contains("synwordcount=1"));
        assert!(ifo.contains(&format!(
            "idxfilesize={}",
            output.artifact.files[1].bytes.len()
        )));
    }

    #[test]
    fn empty_title_is_an_export_error() {
        let mut config = PackagingConfig::default();
        config.title = String::new();
        assert!(StarDictExporter.export(&[], &config).is_err());
    }
}
