//! The `keel.config.toml` settings file.
//!
//! ```text
//! [paths]
//! store = "../packages"
//! fallback_folders = ["/opt/keel/offline"]
//!
//! [[source]]
//! name = "keel.org"
//! url = "https://feed.keel.org/v1"
//! ```
//!
//! Every table is optional; an absent or empty file yields the defaults.

use std::path::Path;
use std::str::FromStr;

use keel_providers::PackageSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Conventional settings file name.
pub const SETTINGS_FILE: &str = "keel.config.toml";

/// Parsed settings, before any path resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    paths: PathSettings,
    #[serde(default, rename = "source")]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PathSettings {
    store: Option<String>,
    #[serde(default)]
    fallback_folders: Vec<String>,
}

/// One `[[source]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: String,
}

impl Settings {
    /// Read settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(file = %path.display(), "loading settings");
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Read settings from a file, or fall back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Settings::load(path)
        } else {
            Ok(Settings::default())
        }
    }

    /// Configured store directory, unresolved.
    pub fn store_dir(&self) -> Option<&str> {
        self.paths.store.as_deref()
    }

    /// Configured fallback folders, unresolved.
    pub fn fallback_folders(&self) -> &[String] {
        &self.paths.fallback_folders
    }

    /// The configured feeds as package sources, in file order.
    pub fn package_sources(&self) -> Vec<PackageSource> {
        self.sources
            .iter()
            .map(|entry| PackageSource::new(&entry.name, &entry.url))
            .collect()
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}
