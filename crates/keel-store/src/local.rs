//! Read-only package discovery over one package folder.
//!
//! A [`LocalStore`] never writes: installation is the extractor's job.
//! Lookups report what is actually on disk, so a version directory without
//! its archive (a torn or in-progress install) is treated as absent.

use std::path::{Path, PathBuf};

use semver::Version;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::folder::PackageFolder;
use crate::integrity::ArchiveHash;
use crate::layout::{StoreLayout, ARCHIVE_EXTENSION, HASH_SUFFIX, MANIFEST_EXTENSION};

/// A package found installed in a local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Package id, echoing the casing the caller asked with.
    pub id: String,
    /// Version as recorded on disk.
    pub version: Version,
    /// Path to the package manifest.
    pub manifest_path: PathBuf,
    /// Path to the package archive.
    pub archive_path: PathBuf,
}

impl InstalledPackage {
    /// Path of the recorded-hash sidecar, beside the archive.
    pub fn hash_path(&self) -> PathBuf {
        let mut name = self.archive_path.as_os_str().to_os_string();
        name.push(HASH_SUFFIX);
        PathBuf::from(name)
    }
}

/// Read-only view of the packages installed under one folder.
#[derive(Debug, Clone)]
pub struct LocalStore {
    folder: PackageFolder,
    layout: StoreLayout,
}

impl LocalStore {
    /// Open a store over a package folder. No I/O happens here.
    pub fn new(folder: PackageFolder) -> Self {
        let layout = StoreLayout::for_folder(&folder);
        LocalStore { folder, layout }
    }

    /// The folder this store reads from.
    pub fn folder(&self) -> &PackageFolder {
        &self.folder
    }

    /// The path layout of this store.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// All installed versions of a package id.
    ///
    /// Returns an empty list, not an error, when the id has no version
    /// list directory beneath an existing root; a missing or unreadable
    /// root is a scan error naming the root. Subdirectories that do not
    /// parse as versions, or that lack their archive file, are skipped.
    /// Returned ids echo the caller's casing; versions carry the casing
    /// of the on-disk directory names. Cancellation is observed at entry
    /// only.
    pub fn find_by_id(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Vec<InstalledPackage>> {
        if token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let list_dir = self.layout.version_list_dir(id);
        if !list_dir.is_dir() {
            // An absent id is benign only when the folder root itself
            // exists.
            return match std::fs::metadata(self.folder.path()) {
                Ok(meta) if meta.is_dir() => Ok(Vec::new()),
                Ok(_) => Err(StoreError::Scan {
                    path: self.folder.path().to_path_buf(),
                    source: std::io::ErrorKind::NotADirectory.into(),
                }),
                Err(source) => Err(StoreError::Scan {
                    path: self.folder.path().to_path_buf(),
                    source,
                }),
            };
        }

        let entries = std::fs::read_dir(&list_dir).map_err(|source| StoreError::Scan {
            path: list_dir.clone(),
            source,
        })?;

        let mut packages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Scan {
                path: list_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!(dir = %path.display(), "skipping non-unicode entry");
                continue;
            };
            let Ok(version) = Version::parse(name) else {
                debug!(dir = %path.display(), "skipping entry that is not a version");
                continue;
            };
            match self.record(id, version) {
                Some(package) => packages.push(package),
                None => debug!(dir = %path.display(), "skipping version without archive"),
            }
        }
        Ok(packages)
    }

    /// The installed package at an exact id and version, if present.
    ///
    /// Absence is `Ok(None)`, never an error. The reported version is the
    /// normalized rendering written at install time, so under a lowercase
    /// folder it comes back lowercased regardless of the casing asked for.
    pub fn get(
        &self,
        id: &str,
        version: &Version,
        token: &CancellationToken,
    ) -> Result<Option<InstalledPackage>> {
        if token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let on_disk = Version::parse(&self.layout.normalize_version(version))?;
        Ok(self.record(id, on_disk))
    }

    /// Load a package record directly from a known archive path.
    ///
    /// The file name must follow `<id>.<version>.keg`; the manifest is
    /// expected beside it. Discovery and normalization are bypassed, so
    /// the id carries the file name's casing.
    pub fn from_archive(
        &self,
        path: &Path,
        token: &CancellationToken,
    ) -> Result<InstalledPackage> {
        if token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if !path.is_file() {
            return Err(StoreError::Scan {
                path: path.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        let (id, version) = split_archive_name(path)?;
        let dir = path.parent().ok_or_else(|| StoreError::MalformedArchiveName {
            path: path.to_path_buf(),
        })?;
        let manifest_path = dir.join(format!("{id}{MANIFEST_EXTENSION}"));
        Ok(InstalledPackage {
            id,
            version,
            manifest_path,
            archive_path: path.to_path_buf(),
        })
    }

    /// Check a package archive against its recorded hash file.
    ///
    /// The sidecar is looked up beside the archive, so records loaded
    /// from outside the store layout verify in place. Returns false when
    /// the hash file is absent or does not match.
    pub fn verify(&self, package: &InstalledPackage) -> Result<bool> {
        let hash_path = package.hash_path();
        if !hash_path.is_file() {
            return Ok(false);
        }
        let recorded = ArchiveHash::load(&hash_path)?;
        recorded.verify_file(&package.archive_path)
    }

    fn record(&self, id: &str, version: Version) -> Option<InstalledPackage> {
        let archive_path = self.layout.archive_path(id, &version);
        if !archive_path.is_file() {
            return None;
        }
        let manifest_path = self.layout.manifest_path(id, &version);
        Some(InstalledPackage {
            id: id.to_string(),
            version,
            manifest_path,
            archive_path,
        })
    }
}

/// Split `<id>.<version>.keg` into id and version.
///
/// Dot positions are tried rightmost first, so the version is the shortest
/// dot-suffix that parses as semver and a dotted id keeps its dots.
fn split_archive_name(path: &Path) -> Result<(String, Version)> {
    let malformed = || StoreError::MalformedArchiveName {
        path: path.to_path_buf(),
    };
    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(malformed)?;
    let stem = name.strip_suffix(ARCHIVE_EXTENSION).ok_or_else(malformed)?;

    let mut end = stem.len();
    while let Some(dot) = stem[..end].rfind('.') {
        if let Ok(version) = Version::parse(&stem[dot + 1..]) {
            return Ok((stem[..dot].to_string(), version));
        }
        end = dot;
    }
    Err(malformed())
}
