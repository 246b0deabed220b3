//! Resolved restore paths.
//!
//! Settings values are strings; this module turns them into concrete
//! package folders. Relative entries resolve against the directory the
//! settings file came from, the user folder honors the `KEEL_PACKAGES`
//! environment override, and fallback folders are always treated as
//! lowercase stores regardless of the caller's layout flag.

use std::path::{Path, PathBuf};

use keel_store::PackageFolder;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::settings::Settings;

/// Environment override for the user package folder. The value is used
/// verbatim, never resolved against the settings directory.
pub const PACKAGES_ENV: &str = "KEEL_PACKAGES";

const HOME_DIR_NAME: &str = ".keel";
const PACKAGES_DIR_NAME: &str = "packages";
const FEED_CACHE_DIR_NAME: &str = "feed-cache";

/// The folders and cache directories one restore session works with.
#[derive(Debug, Clone)]
pub struct PathContext {
    user_folder: PackageFolder,
    fallback_folders: Vec<PackageFolder>,
    feed_cache_dir: PathBuf,
}

impl PathContext {
    /// Resolve settings into concrete paths.
    ///
    /// `config_dir` is the directory the settings file was read from;
    /// `lowercase` is the layout flag for the user folder.
    pub fn create(settings: &Settings, config_dir: &Path, lowercase: bool) -> Result<Self> {
        let override_path = std::env::var_os(PACKAGES_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        PathContext::with_override(settings, config_dir, lowercase, override_path)
    }

    fn with_override(
        settings: &Settings,
        config_dir: &Path,
        lowercase: bool,
        override_path: Option<PathBuf>,
    ) -> Result<Self> {
        let user_path = match override_path {
            Some(path) => path,
            None => match settings.store_dir() {
                Some(store) => resolve(config_dir, store),
                None => home_dir()?.join(HOME_DIR_NAME).join(PACKAGES_DIR_NAME),
            },
        };
        debug!(dir = %user_path.display(), lowercase, "resolved user package folder");
        let user_folder = PackageFolder::new(user_path, lowercase)?;

        let mut fallback_folders = Vec::with_capacity(settings.fallback_folders().len());
        for entry in settings.fallback_folders() {
            // Fallback stores are written lowercased; the caller's flag
            // only applies to the user folder.
            fallback_folders.push(PackageFolder::new(resolve(config_dir, entry), true)?);
        }

        let feed_cache_dir = home_dir()?.join(HOME_DIR_NAME).join(FEED_CACHE_DIR_NAME);
        Ok(PathContext {
            user_folder,
            fallback_folders,
            feed_cache_dir,
        })
    }

    /// The writable user package folder.
    pub fn user_folder(&self) -> &PackageFolder {
        &self.user_folder
    }

    /// Read-only fallback folders, in settings order.
    pub fn fallback_folders(&self) -> &[PackageFolder] {
        &self.fallback_folders
    }

    /// Directory for cached feed responses.
    pub fn feed_cache_dir(&self) -> &Path {
        &self.feed_cache_dir
    }
}

fn resolve(config_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHomeDir)
}
