//! Zip-based archiver.
//!
//! The one concrete [`Archiver`] shipped with the platform layer. Output
//! is deterministic: entry order is the caller's, and every entry carries
//! the epoch timestamp instead of wall-clock time so re-exports stay
//! byte-identical.

use kosha_traits::{ArchiveError, Archiver, NamedBlob};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// EPUB containers require their `mimetype` entry to be stored without
/// compression (and first); readers sniff it at a fixed offset.
const STORED_ENTRY: &str = "mimetype";

#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, files: &[NamedBlob]) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for blob in files {
            if blob.name.is_empty() {
                return Err(ArchiveError::EntryRejected {
                    name: String::new(),
                    message: "empty entry name".to_string(),
                });
            }
            let method = if blob.name == STORED_ENTRY {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default()
                .compression_method(method)
                .last_modified_time(zip::DateTime::default());

            writer
                .start_file(blob.name.as_str(), options)
                .map_err(|e| ArchiveError::EntryRejected {
                    name: blob.name.clone(),
                    message: e.to_string(),
                })?;
            writer
                .write_all(&blob.bytes)
                .map_err(|e| ArchiveError::WriteFailed(e.to_string()))?;
        }

        writer
            .finish()
            .map(|cursor| cursor.into_inner())
            .map_err(|e| ArchiveError::WriteFailed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "ZipArchiver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_zip_magic_header() {
        let archiver = ZipArchiver;
        let bytes = archiver
            .archive(&[NamedBlob::new("a.txt", b"alpha".to_vec())])
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn identical_inputs_produce_identical_archives() {
        let archiver = ZipArchiver;
        let files = vec![
            NamedBlob::new("mimetype", b"application/epub+zip".to_vec()),
            NamedBlob::new("OEBPS/content.opf", b"<package/>".to_vec()),
        ];
        assert_eq!(
            archiver.archive(&files).unwrap(),
            archiver.archive(&files).unwrap()
        );
    }

    #[test]
    fn rejects_unnamed_entries() {
        let archiver = ZipArchiver;
        assert!(matches!(
            archiver.archive(&[NamedBlob::new("", Vec::new())]),
            Err(ArchiveError::EntryRejected { .. })
        ));
    }
}
