//! # kosha
//!
//! Platform layer of the Pali dictionary export pipeline.
//!
//! This crate wires the platform pieces — SQLite entry store, zip
//! archiver, thread-pool executor, CLI — onto the platform-agnostic
//! pipeline in `kosha-core`:
//!
//! ```ignore
//! use kosha::PipelineBuilder;
//!
//! let report = PipelineBuilder::new()
//!     .with_store_path("dpd.db")?
//!     .with_rule_table_file("rules.json")?
//!     .with_output_dir("dist")
//!     .build()?
//!     .run_to_dir()?;
//! println!("exported {} entries", report.exported_entries);
//! ```

// Re-export foundation crates
pub use kosha_idf as idf;
pub use kosha_traits as traits;
pub use kosha_types as types;

// Re-export derivation crates
pub use kosha_deconstruct as deconstruct;
pub use kosha_grammar as grammar;
pub use kosha_render as render;
pub use kosha_xref as xref;

// Re-export the integration layer
pub use kosha_core as core;

pub mod archive;
pub mod pipeline;

// Re-export commonly used types
pub use archive::ZipArchiver;
pub use kosha_core::{PipelineError, PipelineState, RunReport};
pub use kosha_export_core::{Exporter, PackagingConfig};
pub use pipeline::{ExportConfig, ExportPipeline, PipelineBuilder};
