pub mod fixtures;

use kosha::pipeline::ExportConfig;
use kosha::{ExportPipeline, PipelineBuilder};
use kosha_traits::InMemoryEntryStore;
use kosha_types::Entry;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a pipeline over an in-memory store with the standard fixture
/// rule table, writing into `out_dir`.
pub fn pipeline_for(
    entries: Vec<Entry>,
    out_dir: &Path,
    config: ExportConfig,
) -> Result<ExportPipeline, kosha::PipelineError> {
    PipelineBuilder::new()
        .with_store(Arc::new(InMemoryEntryStore::from_entries(entries)))
        .with_rule_table(fixtures::rule_table())
        .with_config(config)
        .with_output_dir(out_dir)
        .with_sync_executor(true)
        .build()
}

/// Names of the entries inside a zip blob, in archive order.
pub fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("zip entry").name().to_string())
        .collect()
}

/// Reads one entry out of a zip blob.
pub fn read_zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("zip entry '{}' missing", name));
    let mut out = Vec::new();
    file.read_to_end(&mut out).expect("readable zip entry");
    out
}

/// Reads the release archive a run wrote to `out_dir`.
pub fn read_release(out_dir: &Path, name: &str) -> Vec<u8> {
    std::fs::read(out_dir.join(name)).expect("release archive on disk")
}
