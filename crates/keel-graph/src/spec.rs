//! Project specifications.
//!
//! A project's dependency inputs live in a TOML spec file beside the
//! project file: `<stem>.keel.toml` when that file exists, else the
//! directory's shared `keel.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Spec file name shared by the projects of one directory.
pub const DEFAULT_SPEC_FILE: &str = "keel.toml";

/// A parsed project specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Project metadata (required).
    pub project: ProjectMetadata,
    /// Package dependencies: id to version requirement.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// Core project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Project name.
    pub name: String,
    /// Semantic version.
    pub version: String,
}

impl ProjectSpec {
    /// Parse a specification from a TOML string.
    pub fn parse(input: &str, origin: &Path) -> Result<Self> {
        let spec: ProjectSpec = toml::from_str(input)?;

        if spec.project.name.is_empty() {
            return Err(GraphError::InvalidSpec {
                path: origin.to_path_buf(),
                detail: "project.name is required".to_string(),
            });
        }

        // Validate version is valid semver
        semver::Version::parse(&spec.project.version)?;

        Ok(spec)
    }

    /// Load a specification from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Get the parsed semantic version.
    pub fn version(&self) -> semver::Version {
        semver::Version::parse(&self.project.version).expect("version validated in parse")
    }
}

/// Resolve the spec file convention for a project file: prefer
/// `<stem>.keel.toml` beside the project, fall back to `keel.toml`.
pub fn spec_path_for_project(project_path: &Path) -> PathBuf {
    let dir = project_path.parent().unwrap_or_else(|| Path::new(""));
    if let Some(stem) = project_path.file_stem().and_then(|s| s.to_str()) {
        let specific = dir.join(format!("{stem}.{DEFAULT_SPEC_FILE}"));
        if specific.is_file() {
            return specific;
        }
    }
    dir.join(DEFAULT_SPEC_FILE)
}

/// Reads project specifications for the graph builder.
pub trait SpecReader {
    /// Where the spec for a project would live.
    fn spec_path(&self, project_path: &Path) -> PathBuf;

    /// Load a spec file. Absence is `Ok(None)`; a present but invalid
    /// spec is an error.
    fn load(&self, spec_path: &Path) -> Result<Option<ProjectSpec>>;
}

/// Convention-following reader over the file system.
#[derive(Debug, Default, Clone)]
pub struct TomlSpecReader;

impl SpecReader for TomlSpecReader {
    fn spec_path(&self, project_path: &Path) -> PathBuf {
        spec_path_for_project(project_path)
    }

    fn load(&self, spec_path: &Path) -> Result<Option<ProjectSpec>> {
        if !spec_path.is_file() {
            return Ok(None);
        }
        ProjectSpec::load(spec_path).map(Some)
    }
}
