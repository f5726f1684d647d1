//! # SVG Component Compiler
//!
//! Compiles parsed vector-graphics element trees into a token-backed
//! component library for a host design tool.
//!
//! ## Pipeline Invariants
//!
//! 1. **Classification**: only nodes with an explicit id are classified. The
//!    tier comes from the number of nearest id'd descendants: 0 is an atom,
//!    1 to 4 a molecule, 5 or more an organism.
//!
//! 2. **Deduplication**: every atom lands in exactly one duplicate group,
//!    keyed by its signature. The first member is canonical; the rest become
//!    variants of its component.
//!
//! 3. **Ordering**: classification, grouping and token extraction finish
//!    before emission starts. Emission is one depth-first walk, so identical
//!    input yields identical token names and command streams.
//!
//! 4. **Fault isolation**: malformed attributes fall back to documented
//!    defaults and unsupported nodes are skipped, both with a warning. Only
//!    [`pipeline::compile_library`] turns failures into `success: false`.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod classify;
pub mod component;
pub mod context;
pub mod discovery;
pub mod document;
pub mod emit;
pub mod finalize;
pub mod geometry;
pub mod host;
pub mod parse;
pub mod pipeline;
pub mod signature;
pub mod style;
pub mod tokens;
pub mod validate;


pub use component::{ComponentArtifact, Variant};
pub use context::{AtomDescriptor, CompileContext, CompositeDescriptor, ShapeKind, Tier};
pub use discovery::{discover_library_files, Discovered};
pub use document::{ComponentEntry, ElementNode, FileStructure, LibraryFile, Settings};
pub use emit::{CommandKind, CreationCommand, LayoutAxis, NodeId};
pub use finalize::CompileSummary;
pub use host::{materialize, HostError, HostHandle, MaterializeReport, SceneHost};
pub use parse::parse_svg_document;
pub use pipeline::{compile_library, compile_library_json, CompileOutput};
pub use tokens::TokenTable;
pub use validate::*;

/// Compiles a JSON file collection. Failures come back inside the JSON
/// output as `success: false`.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_library_native(files_json: String, settings_json: Option<String>) -> String {
    compile_library_json(&files_json, settings_json.as_deref().unwrap_or(""))
}

/// Parses SVG markup into a serialized file record.
#[cfg(feature = "napi")]
#[napi]
pub fn parse_svg_native(source: String, name: String) -> napi::Result<serde_json::Value> {
    let file = parse_svg_document(&source, &name)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_value(file).map_err(|e| napi::Error::from_reason(e.to_string()))
}
