//! Reference graph error types.

use std::path::PathBuf;

/// Errors that can occur while building a project reference graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The dependency-graph input had no lines.
    #[error("dependency graph input is empty")]
    EmptyGraphFile,

    /// The first line matches no known encoding.
    #[error("unrecognized dependency graph format; first line: {line:?}")]
    UnrecognizedFormat { line: String },

    /// A strict parse met a malformed adjacency line.
    #[error("malformed adjacency line {line_number}: {text:?}")]
    MalformedEdge { line_number: usize, text: String },

    /// A strict parse met a repeated entry-point declaration.
    #[error("duplicate entry point: {path}")]
    DuplicateEntryPoint { path: String },

    /// A dependency-graph file failed to load.
    #[error("cannot load dependency graph {path}: {source}")]
    GraphFile {
        path: PathBuf,
        #[source]
        source: Box<GraphError>,
    },

    /// Invalid project specification.
    #[error("invalid project spec at {path}: {detail}")]
    InvalidSpec { path: PathBuf, detail: String },

    /// Structured document failed to deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semver parse error.
    #[error("invalid version: {0}")]
    SemverVersion(#[from] semver::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
