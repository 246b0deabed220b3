//! Local package store for the keel package manager.
//!
//! Defines what identifies a package folder (its root path plus the
//! lowercase naming flag), the deterministic layout of packages and tools
//! beneath one, and read-only discovery of what is installed.
//!
//! # Identity
//!
//! Folder identity is policy-parameterized: a case-insensitive file system
//! compares folder paths ignoring case and disregards the lowercase flag,
//! a case-sensitive one requires the exact path and flag. The policy is
//! detected once from the host and threaded through every cache keyed by
//! folders.
//!
//! Path addressing is pure functions of (root, id, version), so separate
//! processes resolve the same package to the same location without talking
//! to each other.

pub mod error;
pub mod folder;
pub mod integrity;
pub mod layout;
pub mod local;
pub mod tools;

// Re-exports for convenience.
pub use error::{Result, StoreError};
pub use folder::{FolderIdentity, FolderKey, PackageFolder};
pub use integrity::ArchiveHash;
pub use layout::{StoreLayout, ARCHIVE_EXTENSION, HASH_SUFFIX, MANIFEST_EXTENSION};
pub use local::{InstalledPackage, LocalStore};
pub use tools::{ToolLayout, TOOLS_DIR, TOOL_LOCK_FILE};
