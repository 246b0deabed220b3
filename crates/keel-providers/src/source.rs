//! Remote source descriptors.

use std::fmt;

/// A named package source.
///
/// Identity is by value: caches keyed by source treat two equal
/// descriptors as the same source, however they were configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSource {
    name: String,
    url: String,
}

impl PackageSource {
    /// Create a source descriptor.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        PackageSource {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Configured display name of the source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feed location.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// True when the source points at the local file system rather than a
    /// network feed.
    pub fn is_local(&self) -> bool {
        !self.url.contains("://") || self.url.starts_with("file://")
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn value_identity() {
        let a = PackageSource::new("main", "https://pkg.example.com/v1");
        let b = PackageSource::new("main", "https://pkg.example.com/v1");
        let c = PackageSource::new("other", "https://pkg.example.com/v1");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn local_detection() {
        assert!(PackageSource::new("dir", "/var/feeds/dev").is_local());
        assert!(PackageSource::new("file", "file:///var/feeds/dev").is_local());
        assert!(!PackageSource::new("feed", "https://pkg.example.com/v1").is_local());
    }
}
