//! Deterministic on-disk layout of installed packages.
//!
//! Every path is a pure function of the store root, the package id, and
//! the version, so independent processes agree on where a package lives
//! without coordination.
//!
//! Layout:
//! ```text
//! <root>/
//!   <id>/                          version list directory
//!     <version>/                   install directory
//!       <id>.<version>.keg         package archive
//!       <id>.keelspec              package manifest
//!       <id>.<version>.keg.sha512  recorded archive hash
//! ```
//!
//! When the folder's lowercase flag is set, ids and versions are lowercased
//! before they touch the file system; otherwise original casing is kept.

use std::path::{Path, PathBuf};

use semver::{BuildMetadata, Version};

use crate::folder::PackageFolder;

/// File extension for package archives.
pub const ARCHIVE_EXTENSION: &str = ".keg";
/// File extension for package manifests.
pub const MANIFEST_EXTENSION: &str = ".keelspec";
/// Suffix appended to an archive file name for its recorded hash.
pub const HASH_SUFFIX: &str = ".sha512";

/// Computes installed-package paths beneath a store root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
    lowercase: bool,
}

impl StoreLayout {
    /// Create a layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>, lowercase: bool) -> Self {
        StoreLayout {
            root: root.into(),
            lowercase,
        }
    }

    /// Layout for an identified package folder.
    pub fn for_folder(folder: &PackageFolder) -> Self {
        StoreLayout::new(folder.path(), folder.lowercase())
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether ids and versions are lowercased on disk.
    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    /// Directory whose subdirectories are the installed versions of `id`.
    pub fn version_list_dir(&self, id: &str) -> PathBuf {
        self.root.join(self.normalize_id(id))
    }

    /// Directory of one package version, relative to the root.
    pub fn package_dir_name(&self, id: &str, version: &Version) -> PathBuf {
        PathBuf::from(self.normalize_id(id)).join(self.normalize_version(version))
    }

    /// Installation directory for one package version.
    pub fn install_dir(&self, id: &str, version: &Version) -> PathBuf {
        self.version_list_dir(id).join(self.normalize_version(version))
    }

    /// Full path to the package archive.
    pub fn archive_path(&self, id: &str, version: &Version) -> PathBuf {
        self.install_dir(id, version)
            .join(self.archive_file_name(id, version))
    }

    /// Full path to the package manifest.
    pub fn manifest_path(&self, id: &str, version: &Version) -> PathBuf {
        self.install_dir(id, version).join(self.manifest_file_name(id))
    }

    /// Full path to the recorded archive hash.
    pub fn hash_path(&self, id: &str, version: &Version) -> PathBuf {
        self.install_dir(id, version)
            .join(self.hash_file_name(id, version))
    }

    /// Archive file name, `<id>.<version>.keg`.
    pub fn archive_file_name(&self, id: &str, version: &Version) -> String {
        format!(
            "{}.{}{ARCHIVE_EXTENSION}",
            self.normalize_id(id),
            self.normalize_version(version)
        )
    }

    /// Manifest file name, `<id>.keelspec`.
    pub fn manifest_file_name(&self, id: &str) -> String {
        format!("{}{MANIFEST_EXTENSION}", self.normalize_id(id))
    }

    /// Hash file name, `<id>.<version>.keg.sha512`.
    pub fn hash_file_name(&self, id: &str, version: &Version) -> String {
        format!("{}{HASH_SUFFIX}", self.archive_file_name(id, version))
    }

    /// Package id as written to disk.
    pub fn normalize_id(&self, id: &str) -> String {
        if self.lowercase {
            id.to_lowercase()
        } else {
            id.to_string()
        }
    }

    /// Version as written to disk: the canonical semver rendering without
    /// build metadata, lowercased when the folder flag is set.
    pub fn normalize_version(&self, version: &Version) -> String {
        let mut canonical = version.clone();
        canonical.build = BuildMetadata::EMPTY;
        let rendered = canonical.to_string();
        if self.lowercase {
            rendered.to_lowercase()
        } else {
            rendered
        }
    }
}
