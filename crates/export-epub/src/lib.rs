//! Ebook (EPUB) exporter.
//!
//! Entries are ordered by Pali collation (the script's own ordering, not
//! byte order) and grouped into one XHTML page per alphabet letter, plus a
//! title page, an OPF manifest, and an NCX table of contents. The driver
//! packs the file set into the `.epub` container.
//!
//! Every internal cross-link resolves to an in-document anchor, or is
//! degraded to plain text when the target entry is excluded from this
//! particular export: a filtered export must never produce a dangling
//! anchor.

mod xhtml;

use kosha_export_core::{
    Artifact, ArtifactFile, ExportError, ExportOutput, Exporter, PackagingConfig,
};
use kosha_idf::RenderedEntry;
use kosha_types::alphabet::PALI_ALPHABET;
use log::info;
use std::collections::HashMap;

pub const TARGET: &str = "epub";

pub(crate) const MIMETYPE: &str = "application/epub+zip";

/// Where an entry's anchor lives inside the document set.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnchorRef {
    pub file: String,
    pub anchor: String,
}

/// EPUB exporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpubExporter;

impl Exporter for EpubExporter {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn export(
        &self,
        entries: &[RenderedEntry],
        config: &PackagingConfig,
    ) -> Result<ExportOutput, ExportError> {
        if config.title.trim().is_empty() {
            return Err(ExportError::new(TARGET, "dc:title is required"));
        }
        if config.build_date.trim().is_empty() {
            return Err(ExportError::new(TARGET, "dc:date is required"));
        }

        // Collation order first, then letter grouping: within a page the
        // entries already sit in script order.
        let mut sorted: Vec<&RenderedEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| a.sort_key.cmp(&b.sort_key).then(a.id.cmp(&b.id)));

        // Letter pages follow alphabet order; the foreign bucket comes last.
        let mut letters: Vec<&str> = Vec::new();
        for letter in PALI_ALPHABET {
            if sorted.iter().any(|e| e.letter == letter) {
                letters.push(letter);
            }
        }
        if sorted.iter().any(|e| e.letter == RenderedEntry::FOREIGN_LETTER) {
            letters.push(RenderedEntry::FOREIGN_LETTER);
        }

        let page_file = |index: usize, letter: &str| -> String {
            let ascii = if letter == RenderedEntry::FOREIGN_LETTER {
                "other".to_string()
            } else {
                slug::slugify(letter)
            };
            format!("text/{:02}_{}.xhtml", index, ascii)
        };

        // Anchor map before page rendering, so links on any page can reach
        // entries on any other page. Anchor names are positional, which
        // keeps them unique even when slugs of two headwords collide.
        let mut anchors: HashMap<&str, AnchorRef> = HashMap::new();
        for (letter_index, letter) in letters.iter().copied().enumerate() {
            let file = page_file(letter_index, letter);
            for (position, entry) in sorted.iter().filter(|e| e.letter == letter).enumerate() {
                anchors.insert(
                    entry.id.as_str(),
                    AnchorRef {
                        file: file.clone(),
                        anchor: format!("{}-e{}", slug::slugify(letter_page_stub(letter)), position),
                    },
                );
            }
        }

        let mut files = Vec::new();
        files.push(ArtifactFile::new("mimetype", MIMETYPE.as_bytes().to_vec()));
        files.push(ArtifactFile::new(
            "META-INF/container.xml",
            xhtml::container_xml().into_bytes(),
        ));

        let mut degraded_links = 0usize;
        let mut page_files = Vec::new();
        for (letter_index, letter) in letters.iter().copied().enumerate() {
            let file = page_file(letter_index, letter);
            let page_entries: Vec<&RenderedEntry> = sorted
                .iter()
                .copied()
                .filter(|e| e.letter == letter)
                .collect();
            let page = xhtml::letter_page(letter, &page_entries, &file, &anchors, &mut degraded_links);
            files.push(ArtifactFile::new(format!("OEBPS/{}", file), page.into_bytes()));
            page_files.push(file);
        }

        files.push(ArtifactFile::new(
            "OEBPS/text/titlepage.xhtml",
            xhtml::title_page(config).into_bytes(),
        ));
        files.push(ArtifactFile::new(
            "OEBPS/toc.ncx",
            xhtml::toc_ncx(config, &letters, &page_files).into_bytes(),
        ));
        files.push(ArtifactFile::new(
            "OEBPS/content.opf",
            xhtml::content_opf(config, &page_files).into_bytes(),
        ));

        info!(
            "[EXPORT:{}] {} entries over {} letter pages, {} links degraded",
            TARGET,
            sorted.len(),
            letters.len(),
            degraded_links
        );

        Ok(ExportOutput {
            artifact: Artifact {
                target: TARGET,
                files,
                container: Some(format!("{}.epub", config.name)),
            },
            warnings: Vec::new(),
        })
    }
}

/// Human-readable stub of a letter for anchor names.
fn letter_page_stub(letter: &str) -> &str {
    if letter == RenderedEntry::FOREIGN_LETTER {
        "other"
    } else {
        letter
    }
}
