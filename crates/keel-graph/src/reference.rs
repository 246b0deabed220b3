//! Reference graph nodes.

use std::sync::Arc;

use crate::spec::ProjectSpec;

/// One project in a reference closure.
#[derive(Debug, Clone)]
pub struct ProjectReference {
    /// Project file path, spelled as first seen in the input.
    pub path: String,
    /// Parsed project specification, when one exists beside the project.
    pub spec: Option<Arc<ProjectSpec>>,
    /// Paths of the projects this one references directly, sorted.
    pub children: Vec<String>,
}

/// Path key with ASCII-case-insensitive equality and hashing.
///
/// Build systems on case-insensitive file systems emit the same project
/// under varying casings; adjacency must not split such a project in two,
/// on any host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PathKey(String);

impl PathKey {
    pub(crate) fn new(path: &str) -> Self {
        PathKey(path.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn path_key_folds_ascii_case() {
        let mut seen = HashSet::new();
        seen.insert(PathKey::new("/Work/App/app.kproj"));
        assert!(seen.contains(&PathKey::new("/work/app/APP.kproj")));
        assert!(!seen.contains(&PathKey::new("/work/app/other.kproj")));
    }
}
