//! Project reference graphs for restore.
//!
//! Restore starts from the build system's description of which projects
//! reference which. This crate parses that description (two encodings,
//! auto-detected), resolves each entry point to its closure of mentioned
//! projects, and attaches each project's specification file when one
//! exists on disk. Paths compare case-insensitively; the spelling that
//! appears first in the input is the one reported back.

pub mod builder;
pub mod error;
pub mod reference;
pub mod spec;

// Re-exports for convenience.
pub use builder::{GraphDiagnostic, ParseMode, ReferenceGraph};
pub use error::{GraphError, Result};
pub use reference::ProjectReference;
pub use spec::{
    spec_path_for_project, ProjectMetadata, ProjectSpec, SpecReader, TomlSpecReader,
    DEFAULT_SPEC_FILE,
};
