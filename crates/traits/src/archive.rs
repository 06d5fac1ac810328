//! Archiver trait for packaging artifacts.
//!
//! Packaging is consumed as a black box: a set of named byte blobs in, one
//! distributable archive blob out. The pipeline is responsible only for
//! naming and grouping artifacts correctly.

use std::fmt::Debug;
use thiserror::Error;

/// Error type for archiving operations.
#[derive(Error, Debug, Clone)]
pub enum ArchiveError {
    #[error("Archive entry '{name}' rejected: {message}")]
    EntryRejected { name: String, message: String },

    #[error("Archive write failed: {0}")]
    WriteFailed(String),
}

/// A named byte blob destined for an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A black-box archiver producing one archive from named blobs.
///
/// Implementations must be deterministic: the same blobs in the same order
/// must produce byte-identical output, since artifact idempotence is a
/// pipeline-level guarantee.
pub trait Archiver: Send + Sync + Debug {
    /// Packs `files`, preserving their order, into a single archive blob.
    fn archive(&self, files: &[NamedBlob]) -> Result<Vec<u8>, ArchiveError>;

    /// Returns a human-readable name for this archiver (for logging).
    fn name(&self) -> &'static str;
}

/// An archiver that concatenates blobs into a trivial length-prefixed
/// container. Not a real distribution format; it exists so core and tests
/// can exercise packaging without an archive dependency.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryArchiver;

impl Archiver for InMemoryArchiver {
    fn archive(&self, files: &[NamedBlob]) -> Result<Vec<u8>, ArchiveError> {
        let mut out = Vec::new();
        for blob in files {
            if blob.name.is_empty() {
                return Err(ArchiveError::EntryRejected {
                    name: String::new(),
                    message: "empty entry name".to_string(),
                });
            }
            out.extend_from_slice(&(blob.name.len() as u32).to_be_bytes());
            out.extend_from_slice(blob.name.as_bytes());
            out.extend_from_slice(&(blob.bytes.len() as u64).to_be_bytes());
            out.extend_from_slice(&blob.bytes);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "InMemoryArchiver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_archiver_is_deterministic() {
        let archiver = InMemoryArchiver;
        let files = vec![
            NamedBlob::new("a.txt", b"alpha".to_vec()),
            NamedBlob::new("b.txt", b"beta".to_vec()),
        ];
        let first = archiver.archive(&files).unwrap();
        let second = archiver.archive(&files).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn in_memory_archiver_rejects_unnamed_entries() {
        let archiver = InMemoryArchiver;
        let files = vec![NamedBlob::new("", Vec::new())];
        assert!(matches!(
            archiver.archive(&files),
            Err(ArchiveError::EntryRejected { .. })
        ));
    }
}
