//! # kosha-core
//!
//! Platform-agnostic integration layer of the export pipeline.
//!
//! This crate owns the pieces that see the whole run:
//! - **driver**: the stage state machine sequencing Loading → Deriving →
//!   Resolving → Rendering → Exporting → Packaging
//! - **cache**: content-hash-keyed derivation caches
//! - **report**: the structured run report emitted after every run
//! - **sink**: the concurrent warning accumulator
//! - **error**: fatal error types for the pipeline
//!
//! ## Design Principle
//!
//! This crate has **no platform dependencies**: no filesystem writes, no
//! CLI, no archive format. Artifact bytes are produced in memory and the
//! platform layer decides where they land. All platform-specific
//! functionality (SQLite store, zip archiver, thread pools) arrives
//! through the traits in `kosha-traits`.

pub mod cache;
pub mod driver;
pub mod error;
pub mod report;
pub mod sink;

pub use cache::{ContentHash, DerivationCache};
pub use driver::{DriverOptions, PipelineDriver, PipelineState, RunOutcome};
pub use error::PipelineError;
pub use report::{ArtifactSummary, FailedTarget, RunReport};
pub use sink::WarningSink;
