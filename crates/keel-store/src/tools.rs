//! Path addressing for installed tool packages.
//!
//! Tools live in a `.tools` subtree of a package folder, one lock file per
//! (id, version, runtime) triple. The folder's lowercase rule applies to
//! all three path segments.

use std::path::PathBuf;

use semver::Version;

use crate::folder::PackageFolder;
use crate::layout::StoreLayout;

/// Subdirectory of a package folder holding installed tools.
pub const TOOLS_DIR: &str = ".tools";
/// Lock file recording a tool's resolved dependency set.
pub const TOOL_LOCK_FILE: &str = "tool.lock.toml";

/// Computes tool lock-file paths beneath a store root.
#[derive(Debug, Clone)]
pub struct ToolLayout {
    layout: StoreLayout,
}

impl ToolLayout {
    /// Create a tool layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>, lowercase: bool) -> Self {
        ToolLayout {
            layout: StoreLayout::new(root, lowercase),
        }
    }

    /// Tool layout for an identified package folder.
    pub fn for_folder(folder: &PackageFolder) -> Self {
        ToolLayout {
            layout: StoreLayout::for_folder(folder),
        }
    }

    /// Lock-file path for one installed tool:
    /// `<root>/.tools/<id>/<version>/<runtime>/tool.lock.toml`.
    pub fn lock_file_path(&self, id: &str, version: &Version, runtime: &str) -> PathBuf {
        let runtime = if self.layout.lowercase() {
            runtime.to_lowercase()
        } else {
            runtime.to_string()
        };
        self.layout
            .root()
            .join(TOOLS_DIR)
            .join(self.layout.normalize_id(id))
            .join(self.layout.normalize_version(version))
            .join(runtime)
            .join(TOOL_LOCK_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn lock_file_path_lowercased() {
        let tools = ToolLayout::new("/store", true);
        let v = Version::parse("1.0.0-Beta").unwrap();
        assert_eq!(
            tools.lock_file_path("MyTool", &v, "Rt2.1"),
            Path::new("/store/.tools/mytool/1.0.0-beta/rt2.1/tool.lock.toml")
        );
    }

    #[test]
    fn lock_file_path_original_case() {
        let tools = ToolLayout::new("/store", false);
        let v = Version::parse("1.0.0-Beta").unwrap();
        assert_eq!(
            tools.lock_file_path("MyTool", &v, "Rt2.1"),
            Path::new("/store/.tools/MyTool/1.0.0-Beta/Rt2.1/tool.lock.toml")
        );
    }

    #[test]
    fn lock_file_path_follows_folder_flag() {
        let folder = PackageFolder::new("/global", true).unwrap();
        let tools = ToolLayout::for_folder(&folder);
        let v = Version::parse("2.1.0").unwrap();
        assert_eq!(
            tools.lock_file_path("fmt", &v, "rt1"),
            Path::new("/global/.tools/fmt/2.1.0/rt1/tool.lock.toml")
        );
    }
}
