//! Package folder identity.
//!
//! A package folder is a root directory holding installed packages, paired
//! with the flag saying whether ids and versions were lowercased when
//! written beneath it. Whether two folder values name the same folder
//! depends on the host file system: on a case-insensitive file system the
//! paths alone decide (a lowercasing and a case-preserving view of one
//! directory are the same store), while on a case-sensitive file system
//! both the exact path and the flag must match.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// A package folder root together with its lowercase naming flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageFolder {
    path: PathBuf,
    lowercase: bool,
}

impl PackageFolder {
    /// Create a folder descriptor. The path must be non-empty.
    pub fn new(path: impl Into<PathBuf>, lowercase: bool) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(StoreError::EmptyFolderPath);
        }
        Ok(PackageFolder { path, lowercase })
    }

    /// Root directory of the folder.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when package ids and versions are lowercased on disk.
    pub fn lowercase(&self) -> bool {
        self.lowercase
    }
}

/// Equality policy for package folders.
///
/// The policy is fixed once per process from the host file system; every
/// cache keyed by folder identity must use the same policy for its whole
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderIdentity {
    case_sensitive: bool,
}

impl FolderIdentity {
    /// Policy with an explicit case sensitivity.
    pub fn new(case_sensitive: bool) -> Self {
        FolderIdentity { case_sensitive }
    }

    /// Policy matching the host file system: Windows and macOS compare
    /// paths ignoring case, everything else is case-sensitive.
    pub fn host() -> Self {
        FolderIdentity::new(!cfg!(any(windows, target_os = "macos")))
    }

    /// Whether this policy distinguishes path casing.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Folder equality under this policy.
    ///
    /// Case-insensitive policies compare paths only, ignoring the
    /// lowercase flags; case-sensitive policies require the exact path and
    /// the flag to match.
    pub fn eq(&self, a: &PackageFolder, b: &PackageFolder) -> bool {
        if self.case_sensitive {
            a.path == b.path && a.lowercase == b.lowercase
        } else {
            path_str(a).eq_ignore_ascii_case(&path_str(b))
        }
    }

    /// Hashable projection of a folder, consistent with [`FolderIdentity::eq`]:
    /// two folders are equal under the policy exactly when their keys are
    /// equal. The sensitive key carries the exact path bytes; the
    /// insensitive key is the lossy ASCII-lowercased rendering, matching
    /// what `eq` compares.
    pub fn key(&self, folder: &PackageFolder) -> FolderKey {
        if self.case_sensitive {
            FolderKey {
                path: folder.path.as_os_str().to_os_string(),
                lowercase: Some(folder.lowercase),
            }
        } else {
            FolderKey {
                path: path_str(folder).to_ascii_lowercase().into(),
                lowercase: None,
            }
        }
    }

    /// Order-preserving dedup of folders by path.
    ///
    /// Only the path participates, under this policy's path comparison;
    /// the lowercase flags are ignored on both policies. The first
    /// occurrence of each path wins.
    pub fn dedup(&self, folders: impl IntoIterator<Item = PackageFolder>) -> Vec<PackageFolder> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for folder in folders {
            let key: OsString = if self.case_sensitive {
                folder.path.as_os_str().to_os_string()
            } else {
                path_str(&folder).to_ascii_lowercase().into()
            };
            if seen.insert(key) {
                unique.push(folder);
            }
        }
        unique
    }
}

/// Identity key of a [`PackageFolder`] under a fixed [`FolderIdentity`].
///
/// Keys produced by different policies must not be mixed in one map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderKey {
    path: OsString,
    lowercase: Option<bool>,
}

fn path_str(folder: &PackageFolder) -> Cow<'_, str> {
    folder.path.to_string_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(path: &str, lowercase: bool) -> PackageFolder {
        PackageFolder::new(path, lowercase).unwrap()
    }

    #[test]
    fn empty_path_rejected() {
        assert!(matches!(
            PackageFolder::new("", true),
            Err(StoreError::EmptyFolderPath)
        ));
    }

    #[test]
    fn insensitive_policy_ignores_flag_and_case() {
        let identity = FolderIdentity::new(false);
        let a = folder("/Packages/Global", true);
        let b = folder("/packages/global", false);
        assert!(identity.eq(&a, &b));
        assert_eq!(identity.key(&a), identity.key(&b));
    }

    #[test]
    fn insensitive_policy_distinguishes_paths() {
        let identity = FolderIdentity::new(false);
        let a = folder("/packages/one", true);
        let b = folder("/packages/two", true);
        assert!(!identity.eq(&a, &b));
        assert_ne!(identity.key(&a), identity.key(&b));
    }

    #[test]
    fn sensitive_policy_requires_exact_path_and_flag() {
        let identity = FolderIdentity::new(true);
        let base = folder("/packages/global", true);
        let same = folder("/packages/global", true);
        let other_flag = folder("/packages/global", false);
        let other_case = folder("/Packages/Global", true);

        assert!(identity.eq(&base, &same));
        assert!(!identity.eq(&base, &other_flag));
        assert!(!identity.eq(&base, &other_case));

        assert_eq!(identity.key(&base), identity.key(&same));
        assert_ne!(identity.key(&base), identity.key(&other_flag));
        assert_ne!(identity.key(&base), identity.key(&other_case));
    }

    #[test]
    fn keys_agree_with_equality() {
        let folders = [
            folder("/a", true),
            folder("/a", false),
            folder("/A", true),
            folder("/b", true),
        ];
        for identity in [FolderIdentity::new(true), FolderIdentity::new(false)] {
            for x in &folders {
                for y in &folders {
                    assert_eq!(
                        identity.eq(x, y),
                        identity.key(x) == identity.key(y),
                        "key/eq mismatch for {x:?} vs {y:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn dedup_collapses_case_variants_under_insensitive_policy() {
        let identity = FolderIdentity::new(false);
        let unique = identity.dedup([
            folder("/Fallback/One", true),
            folder("/fallback/one", false),
            folder("/fallback/two", true),
        ]);
        assert_eq!(unique.len(), 2);
        // First occurrence wins.
        assert_eq!(unique[0].path(), Path::new("/Fallback/One"));
    }

    #[test]
    fn dedup_keeps_case_variants_under_sensitive_policy() {
        let identity = FolderIdentity::new(true);
        let unique = identity.dedup([folder("/fallback", true), folder("/Fallback", true)]);
        assert_eq!(unique.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn sensitive_keys_distinguish_non_unicode_paths() {
        use std::os::unix::ffi::OsStringExt;

        let identity = FolderIdentity::new(true);
        // Both paths render lossily as "/store/\u{FFFD}".
        let a = PackageFolder::new(
            PathBuf::from(OsString::from_vec(b"/store/\xff".to_vec())),
            true,
        )
        .unwrap();
        let b = PackageFolder::new(
            PathBuf::from(OsString::from_vec(b"/store/\xfe".to_vec())),
            true,
        )
        .unwrap();

        assert!(!identity.eq(&a, &b));
        assert_ne!(identity.key(&a), identity.key(&b));
        assert_eq!(identity.dedup([a, b]).len(), 2);
    }

    #[test]
    fn dedup_ignores_flag_on_both_policies() {
        for identity in [FolderIdentity::new(true), FolderIdentity::new(false)] {
            let unique = identity.dedup([folder("/shared", true), folder("/shared", false)]);
            assert_eq!(unique.len(), 1);
            assert!(unique[0].lowercase());
        }
    }
}
