//! Export pipeline orchestration.
//!
//! This module contains the platform-side pipeline components:
//!
//! - [`PipelineBuilder`]: fluent builder wiring stores, rule tables,
//!   exporters, and executors into a runnable pipeline
//! - [`ExportConfig`]: the serde-loaded run configuration
//! - [`ExportPipeline`]: a configured run that writes its release archive
//!   and run report to an output directory

mod builder;
pub mod config;

pub use builder::{ExportPipeline, PipelineBuilder};
pub use config::ExportConfig;
