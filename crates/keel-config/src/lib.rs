//! Settings and path resolution for restore.
//!
//! Reads `keel.config.toml`, then turns its string-valued paths into the
//! [`PackageFolder`](keel_store::PackageFolder) values and feed sources
//! the rest of restore consumes.

pub mod error;
pub mod paths;
pub mod settings;

// Re-exports for convenience.
pub use error::{ConfigError, Result};
pub use paths::{PathContext, PACKAGES_ENV};
pub use settings::{Settings, SourceEntry, SETTINGS_FILE};
