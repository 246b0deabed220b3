//! Store error types.

use std::path::PathBuf;

/// Errors that can occur during package store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A package folder was constructed with an empty path.
    #[error("package folder path must not be empty")]
    EmptyFolderPath,

    /// Directory enumeration failed while scanning a store.
    #[error("cannot read package store at {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File name does not follow `<id>.<version>.keg`.
    #[error("not a package archive: {path}")]
    MalformedArchiveName { path: PathBuf },

    /// Recorded hash file is missing, unreadable, or not a digest.
    #[error("bad hash file at {path}: {detail}")]
    HashFile { path: PathBuf, detail: String },

    /// The operation observed a cancellation request.
    #[error("store operation cancelled")]
    Cancelled,

    /// Semver parse error.
    #[error("invalid version: {0}")]
    SemverVersion(#[from] semver::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
