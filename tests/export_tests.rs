mod common;

use common::fixtures::*;
use common::{TestResult, pipeline_for, read_release, read_zip_entry, zip_entry_names};
use kosha::pipeline::ExportConfig;
use std::collections::HashSet;

fn run_release(entries: Vec<kosha_types::Entry>, config: ExportConfig) -> Vec<u8> {
    let out = tempfile::tempdir().unwrap();
    let mut pipeline = pipeline_for(entries, out.path(), config).unwrap();
    pipeline.run_to_dir().unwrap();
    read_release(out.path(), "kosha-release.zip")
}

#[test]
fn release_contains_every_configured_target() -> TestResult {
    let release = run_release(sample_lexicon(), ExportConfig::default());
    let names = zip_entry_names(&release);

    assert!(names.contains(&"kosha-deck.tsv".to_string()));
    assert!(names.contains(&"kosha-stardict.zip".to_string()));
    assert!(names.contains(&"kosha.epub".to_string()));
    Ok(())
}

#[test]
fn epub_mimetype_is_first_and_stored() -> TestResult {
    let release = run_release(sample_lexicon(), ExportConfig::default());
    let epub = read_zip_entry(&release, "kosha.epub");

    let names = zip_entry_names(&epub);
    assert_eq!(names[0], "mimetype");
    assert_eq!(read_zip_entry(&epub, "mimetype"), b"application/epub+zip");
    Ok(())
}

#[test]
fn epub_internal_links_resolve_or_degrade() -> TestResult {
    // Referential integrity of the actual artifact: every href target
    // must exist as an id somewhere in the document set.
    let release = run_release(sample_lexicon(), ExportConfig::default());
    let epub = read_zip_entry(&release, "kosha.epub");

    let mut xhtml = String::new();
    for name in zip_entry_names(&epub) {
        if name.ends_with(".xhtml") {
            xhtml.push_str(&String::from_utf8(read_zip_entry(&epub, &name))?);
        }
    }

    let ids: HashSet<&str> = xhtml
        .split("id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .collect();

    let mut href_count = 0;
    for rest in xhtml.split("href=\"").skip(1) {
        let href = rest.split('"').next().unwrap_or("");
        let anchor = href.split('#').nth(1);
        if let Some(anchor) = anchor {
            href_count += 1;
            assert!(ids.contains(anchor), "dangling anchor: {}", href);
        }
    }
    assert!(href_count > 0, "fixture lexicon must produce internal links");
    Ok(())
}

#[test]
fn filtered_epub_degrades_links_to_excluded_entries() -> TestResult {
    // Export only the dh pages: the dhammacakka deconstruction links to
    // cakka, which is excluded, so the link must degrade to plain text.
    let config = ExportConfig {
        letters: Some(vec!["dh".to_string()]),
        targets: vec!["epub".to_string()],
        ..ExportConfig::default()
    };
    let release = run_release(sample_lexicon(), config);
    let epub = read_zip_entry(&release, "kosha.epub");

    let mut xhtml = String::new();
    for name in zip_entry_names(&epub) {
        if name.ends_with(".xhtml") {
            xhtml.push_str(&String::from_utf8(read_zip_entry(&epub, &name))?);
        }
    }

    assert!(xhtml.contains("cakka"), "constituent text must survive");
    for rest in xhtml.split("href=\"").skip(1) {
        let href = rest.split('"').next().unwrap_or("");
        assert!(
            !href.contains("_c.xhtml"),
            "no link may point at an excluded page: {}",
            href
        );
    }
    Ok(())
}

#[test]
fn flashcard_deck_has_no_duplicate_cards() -> TestResult {
    let release = run_release(sample_lexicon(), ExportConfig::default());
    let deck = String::from_utf8(read_zip_entry(&release, "kosha-deck.tsv"))?;

    let mut seen = HashSet::new();
    for line in deck.lines().skip(2) {
        let mut fields = line.split('\t');
        let front = fields.next().unwrap_or("").trim().to_lowercase();
        let back = fields.next().unwrap_or("").trim().to_lowercase();
        let gloss = back.split("<br>").next().unwrap_or("").to_string();
        assert!(
            seen.insert((front.clone(), gloss)),
            "duplicate card for {}",
            front
        );
    }
    Ok(())
}

#[test]
fn stardict_package_is_complete_and_sorted() -> TestResult {
    let release = run_release(sample_lexicon(), ExportConfig::default());
    let package = read_zip_entry(&release, "kosha-stardict.zip");
    let names = zip_entry_names(&package);

    for ext in ["ifo", "idx", "syn", "dict"] {
        assert!(
            names.contains(&format!("kosha.{}", ext)),
            "missing kosha.{}",
            ext
        );
    }

    // Keys come back in index order; check pairwise sortedness.
    let idx = read_zip_entry(&package, "kosha.idx");
    let mut keys = Vec::new();
    let mut rest = &idx[..];
    while !rest.is_empty() {
        let nul = rest.iter().position(|&b| b == 0).unwrap();
        keys.push(String::from_utf8(rest[..nul].to_vec())?);
        rest = &rest[nul + 9..];
    }
    assert_eq!(keys.len(), 7);
    for pair in keys.windows(2) {
        let a = pair[0].to_lowercase();
        let b = pair[1].to_lowercase();
        assert!(a <= b, "idx out of order: {} > {}", pair[0], pair[1]);
    }

    // Inflected lookup forms land in the synonym index.
    let syn = String::from_utf8_lossy(&read_zip_entry(&package, "kosha.syn")).into_owned();
    assert!(syn.contains("dhammo"), "inflection dhammo must be indexed");
    assert!(syn.contains("nibbana"), "clean spelling must be indexed");
    Ok(())
}

#[test]
fn dictionary_reader_record_concatenates_glosses_in_order() -> TestResult {
    // The dhamma worked example: two senses, one record, original order.
    let config = ExportConfig {
        targets: vec!["stardict".to_string()],
        ..ExportConfig::default()
    };
    let release = run_release(sample_lexicon(), config);
    let package = read_zip_entry(&release, "kosha-stardict.zip");
    let dict = String::from_utf8(read_zip_entry(&package, "kosha.dict"))?;

    let law = dict.find("law").expect("first gloss present");
    let teaching = dict.find("teaching").expect("second gloss present");
    assert!(law < teaching, "gloss order must follow sense order");
    Ok(())
}

#[test]
fn oversized_flashcard_field_gets_truncation_marker() -> TestResult {
    let mut entries = sample_lexicon();
    let long_gloss = "very long gloss ".repeat(400);
    entries[0].senses[0].gloss = long_gloss;

    let out = tempfile::tempdir()?;
    let mut pipeline = pipeline_for(entries, out.path(), ExportConfig::default())?;
    let outcome = pipeline.run();

    assert!(outcome.report.warnings_by_kind["truncated_field"] >= 1);
    let release = outcome.release.unwrap();
    let deck = String::from_utf8(read_zip_entry(&release.bytes, "kosha-deck.tsv"))?;
    assert!(deck.contains("see full entry: dhamma"));
    Ok(())
}
