//! XHTML / OPF / NCX generation.
//!
//! All output here is deterministic text assembled from the rendered
//! entries and the packaging config. Escaping happens at this boundary;
//! nothing upstream knows XML exists.

use crate::{AnchorRef, MIMETYPE};
use kosha_export_core::PackagingConfig;
use kosha_idf::{EntryBlock, InlineSpan, RenderedEntry};
use std::collections::HashMap;
use std::fmt::Write;

/// Escapes text content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

pub(crate) fn container_xml() -> String {
    concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n",
        "  <rootfiles>\n",
        "    <rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n",
        "  </rootfiles>\n",
        "</container>\n"
    )
    .to_string()
}

fn xhtml_head(title: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{}</title></head>\n\
         <body>\n",
        escape(title)
    )
}

const XHTML_FOOT: &str = "</body>\n</html>\n";

/// Renders one letter's page.
///
/// `current_file` is the page's own path relative to `OEBPS/`, used to
/// shorten same-page links; `degraded` counts links whose target is not
/// in this export.
pub(crate) fn letter_page(
    letter: &str,
    entries: &[&RenderedEntry],
    current_file: &str,
    anchors: &HashMap<&str, AnchorRef>,
    degraded: &mut usize,
) -> String {
    let display_letter = if letter == RenderedEntry::FOREIGN_LETTER {
        "…"
    } else {
        letter
    };
    let mut page = xhtml_head(display_letter);
    let _ = write!(page, "<h1>{}</h1>\n", escape(display_letter));

    for entry in entries {
        let anchor = anchors
            .get(entry.id.as_str())
            .map(|a| a.anchor.as_str())
            .unwrap_or("");
        let _ = write!(page, "<div class=\"entry\" id=\"{}\">\n", escape(anchor));
        for block in &entry.blocks {
            page.push_str(&render_block(block, current_file, anchors, degraded));
        }
        page.push_str("</div>\n");
    }

    page.push_str(XHTML_FOOT);
    page
}

fn render_block(
    block: &EntryBlock,
    current_file: &str,
    anchors: &HashMap<&str, AnchorRef>,
    degraded: &mut usize,
) -> String {
    match block {
        EntryBlock::Summary(spans) => format!(
            "<p class=\"summary\">{}</p>\n",
            render_spans(spans, current_file, anchors, degraded)
        ),
        EntryBlock::GlossList(rows) => {
            if rows.len() == 1 {
                format!(
                    "<p class=\"gloss\">{}</p>\n",
                    render_spans(&rows[0], current_file, anchors, degraded)
                )
            } else {
                let mut list = String::from("<ol class=\"gloss\">\n");
                for row in rows {
                    let _ = write!(
                        list,
                        "<li>{}</li>\n",
                        render_spans(row, current_file, anchors, degraded)
                    );
                }
                list.push_str("</ol>\n");
                list
            }
        }
        EntryBlock::GrammarTable {
            inflection_class,
            rows,
        } => {
            let mut table = format!(
                "<table class=\"grammar\"><caption>{}</caption>\n",
                escape(inflection_class)
            );
            for row in rows {
                let _ = write!(
                    table,
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    escape(&row.label),
                    escape(&row.surface)
                );
            }
            table.push_str("</table>\n");
            table
        }
        EntryBlock::Deconstruction(spans) => format!(
            "<p class=\"deconstruction\">{}</p>\n",
            render_spans(spans, current_file, anchors, degraded)
        ),
        EntryBlock::Example { spans, citation } => {
            let mut example = format!(
                "<blockquote class=\"example\">{}",
                render_spans(spans, current_file, anchors, degraded)
            );
            if !citation.is_empty() {
                let _ = write!(example, "<cite>{}</cite>", escape(citation));
            }
            example.push_str("</blockquote>\n");
            example
        }
    }
}

fn render_spans(
    spans: &[InlineSpan],
    current_file: &str,
    anchors: &HashMap<&str, AnchorRef>,
    degraded: &mut usize,
) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            InlineSpan::Text(text) => out.push_str(&escape(text)),
            InlineSpan::Emphasis(text) => {
                let _ = write!(out, "<b>{}</b>", escape(text));
            }
            InlineSpan::GrammarRef(text) => {
                let _ = write!(out, "<i>{}</i>", escape(text));
            }
            InlineSpan::Link { target, label } => match anchors.get(target.as_str()) {
                Some(anchor) => {
                    let href = if anchor.file == current_file {
                        format!("#{}", anchor.anchor)
                    } else {
                        // Pages all live under text/, so cross-page hrefs
                        // are plain file names.
                        let file = anchor.file.rsplit('/').next().unwrap_or(&anchor.file);
                        format!("{}#{}", file, anchor.anchor)
                    };
                    let _ = write!(out, "<a href=\"{}\">{}</a>", escape(&href), escape(label));
                }
                // Target excluded from this export: keep the text, drop
                // the link.
                None => {
                    *degraded += 1;
                    out.push_str(&escape(label));
                }
            },
        }
    }
    out
}

pub(crate) fn title_page(config: &PackagingConfig) -> String {
    let mut page = xhtml_head(&config.title);
    let _ = write!(
        page,
        "<h1>{}</h1>\n<p class=\"compiled\">Compiled {}</p>\n",
        escape(&config.title),
        escape(&config.build_date)
    );
    page.push_str(XHTML_FOOT);
    page
}

pub(crate) fn toc_ncx(config: &PackagingConfig, letters: &[&str], page_files: &[String]) -> String {
    let mut ncx = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\">\n\
         <head><meta name=\"dtb:uid\" content=\"{}\"/></head>\n\
         <docTitle><text>{}</text></docTitle>\n\
         <navMap>\n",
        escape(&config.name),
        escape(&config.title)
    );

    let mut play_order = 1;
    let _ = write!(
        ncx,
        "<navPoint id=\"titlepage\" playOrder=\"{}\"><navLabel><text>{}</text></navLabel>\
         <content src=\"text/titlepage.xhtml\"/></navPoint>\n",
        play_order,
        escape(&config.title)
    );

    for (letter, file) in letters.iter().zip(page_files) {
        play_order += 1;
        let display = if *letter == RenderedEntry::FOREIGN_LETTER {
            "…"
        } else {
            letter
        };
        let _ = write!(
            ncx,
            "<navPoint id=\"nav{}\" playOrder=\"{}\"><navLabel><text>{}</text></navLabel>\
             <content src=\"{}\"/></navPoint>\n",
            play_order,
            play_order,
            escape(display),
            escape(file)
        );
    }

    ncx.push_str("</navMap>\n</ncx>\n");
    ncx
}

pub(crate) fn content_opf(config: &PackagingConfig, page_files: &[String]) -> String {
    let mut opf = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <package xmlns=\"http://www.idpf.org/2007/opf\" unique-identifier=\"uid\" version=\"2.0\">\n\
         <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n\
         <dc:identifier id=\"uid\">{}</dc:identifier>\n\
         <dc:title>{}</dc:title>\n\
         <dc:language>{}</dc:language>\n\
         <dc:date>{}</dc:date>\n\
         </metadata>\n\
         <manifest>\n\
         <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n\
         <item id=\"titlepage\" href=\"text/titlepage.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
        escape(&config.name),
        escape(&config.title),
        escape(&config.lang),
        escape(&config.build_date)
    );

    for (index, file) in page_files.iter().enumerate() {
        let _ = write!(
            opf,
            "<item id=\"page{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            index,
            escape(file)
        );
    }

    opf.push_str("</manifest>\n<spine toc=\"ncx\">\n<itemref idref=\"titlepage\"/>\n");
    for index in 0..page_files.len() {
        let _ = write!(opf, "<itemref idref=\"page{}\"/>\n", index);
    }
    opf.push_str("</spine>\n</package>\n");
    opf
}
