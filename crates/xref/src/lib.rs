//! Headword index and cross-reference resolution.
//!
//! The resolver runs in a single pass: build an index from every surface
//! (canonical headword, alternate spellings) to its candidate entries,
//! then look every declared reference up. Unresolved lookups are collected
//! as warnings, never thrown, so the resolver always completes and
//! produces a usable graph. Downstream renderers treat a missing
//! resolution as "omit the link, keep the text".

pub mod index;
pub mod resolver;

pub use index::{HeadwordIndex, Resolution};
pub use resolver::{LinkSource, ResolvedEdge, XrefGraph, resolve_references};
