//! Core export abstractions.
//!
//! Every exporter is a leaf transformation from the rendered entry set to
//! one target artifact. Exporters apply their own format constraints and
//! escaping; on an unrecoverable constraint they fail with [`ExportError`]
//! and their partial output is discarded, never written half-complete.
//! Other targets continue.

use kosha_idf::RenderedEntry;
use kosha_types::Warning;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A named byte blob inside an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArtifactFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// One target's complete export output.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Target name, e.g. `"anki"`.
    pub target: &'static str,
    /// Files in the order they must be packaged.
    pub files: Vec<ArtifactFile>,
    /// For multi-file targets, the name of the container archive the
    /// driver packs the files into (e.g. `"kosha.epub"`). Single-file
    /// targets leave this `None` and ship their file directly.
    pub container: Option<String>,
}

impl Artifact {
    /// Total payload size across all files.
    pub fn byte_size(&self) -> usize {
        self.files.iter().map(|f| f.bytes.len()).sum()
    }
}

/// An exporter's successful result: the artifact plus any per-item
/// warnings (truncations, degraded links) it accumulated.
#[derive(Debug)]
pub struct ExportOutput {
    pub artifact: Artifact,
    pub warnings: Vec<Warning>,
}

/// Unrecoverable failure of one export target.
#[derive(Error, Debug, Clone)]
#[error("Export target '{target}' failed: {cause}")]
pub struct ExportError {
    pub target: &'static str,
    pub cause: String,
}

impl ExportError {
    pub fn new(target: &'static str, cause: impl fmt::Display) -> Self {
        Self {
            target,
            cause: cause.to_string(),
        }
    }
}

/// Packaging configuration shared by all exporters.
///
/// Everything that ends up in artifact bytes lives here, never read from
/// the environment: identical inputs must produce byte-identical
/// artifacts, so wall-clock time and hostnames are off limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// Base name for artifacts and the release archive, e.g. `"kosha"`.
    pub name: String,
    /// Human-readable dictionary title.
    pub title: String,
    /// Deck name for the flashcard exporter. Required by that target.
    #[serde(default)]
    pub deck_name: Option<String>,
    /// Per-field size limit for flashcard fields, in characters.
    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,
    /// Release date stamped into ebook metadata, ISO 8601. Supplied by
    /// configuration so re-exports stay reproducible.
    pub build_date: String,
    /// ISO language tag of the source language.
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_max_field_len() -> usize {
    2000
}

fn default_lang() -> String {
    "pi".to_string()
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            name: "kosha".to_string(),
            title: "Kosha Pali Dictionary".to_string(),
            deck_name: Some("Kosha".to_string()),
            max_field_len: default_max_field_len(),
            build_date: "1970-01-01".to_string(),
            lang: default_lang(),
        }
    }
}

/// A leaf transformation from rendered entries to one target artifact.
pub trait Exporter: Send + Sync {
    /// Stable target name used in reports, logs, and error values.
    fn target(&self) -> &'static str;

    /// Exports the full (possibly filtered) rendered entry set.
    ///
    /// The slice is already in store order; exporters that need a
    /// different ordering (collation, index sort) sort a copy.
    fn export(
        &self,
        entries: &[RenderedEntry],
        config: &PackagingConfig,
    ) -> Result<ExportOutput, ExportError>;
}
