//! Fatal error types for the pipeline.
//!
//! Only store-level and packaging-level failures (and cancellation) are
//! fatal to a run. Per-item issues travel through the warning sink, and a
//! single target's `ExportError` is recorded in the run report while the
//! other targets continue.

use kosha_grammar::RuleTableError;
use kosha_traits::{ArchiveError, StoreError};
use kosha_types::Stage;
use thiserror::Error;

/// The main error enum for all high-level pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Entry store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Rule table failure: {0}")]
    Rules(#[from] RuleTableError),

    #[error("Packaging failed: {0}")]
    Packaging(#[from] ArchiveError),

    #[error("Run cancelled during the {0} stage")]
    Cancelled(Stage),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// The stage a fatal error belongs to, for the `Failed(stage)`
    /// terminal state.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Store(_) => Stage::Loading,
            PipelineError::Rules(_) => Stage::Loading,
            PipelineError::Config(_) => Stage::Loading,
            PipelineError::Packaging(_) => Stage::Packaging,
            PipelineError::Cancelled(stage) => *stage,
            PipelineError::Io(_) | PipelineError::Json(_) => Stage::Packaging,
        }
    }
}
