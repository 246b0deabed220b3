//! Dependency providers.
//!
//! A provider answers the resolver's "what versions of this id can you
//! see" question against one package source. Local package folders get a
//! concrete implementation here; remote feeds are built by an injected
//! factory so the feed protocol stays out of this crate.

use std::sync::Arc;

use semver::Version;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use keel_store::{LocalStore, StoreError};

use crate::context::CacheContext;
use crate::error::{ProviderError, Result};
use crate::source::PackageSource;

/// Abstract candidate-listing provider.
pub trait DependencyProvider: Send + Sync {
    /// Human-readable description of where the packages come from.
    fn source(&self) -> &str;

    /// True for providers backed by a remote feed.
    fn is_remote(&self) -> bool;

    /// Candidate versions available for a package id.
    fn list_candidates(&self, id: &str, token: &CancellationToken) -> Result<Vec<Version>>;
}

/// Builds remote providers from source descriptors.
///
/// Construction must be side-effect-free: a provider that loses a cache
/// race is discarded without ever having touched the network.
pub trait RemoteProviderFactory: Send + Sync {
    /// Create a provider for one remote source.
    fn create(
        &self,
        source: &PackageSource,
        context: &Arc<CacheContext>,
    ) -> Arc<dyn DependencyProvider>;
}

/// Provider over one local package folder.
///
/// The global folder is an opportunistic cache: unreadable only means
/// nothing is cached, so its provider absorbs failures silently. Fallback
/// folders are part of the configured package universe and fail the
/// restore when unreadable, unless the session opted into leniency.
pub struct FolderProvider {
    store: Arc<LocalStore>,
    source: String,
    ignore_failures: bool,
    suppress_warnings: bool,
}

impl FolderProvider {
    /// Tolerant provider for the global packages folder.
    pub fn global(store: Arc<LocalStore>) -> Self {
        FolderProvider::new(store, true, true)
    }

    /// Fallback-folder provider: warns on failure, and only continues past
    /// it when the session ignores failed sources.
    pub fn fallback(store: Arc<LocalStore>, context: &CacheContext) -> Self {
        FolderProvider::new(store, context.ignore_failed_sources(), false)
    }

    /// Provider with explicit strictness flags.
    pub fn new(store: Arc<LocalStore>, ignore_failures: bool, suppress_warnings: bool) -> Self {
        let source = store.folder().path().display().to_string();
        FolderProvider {
            store,
            source,
            ignore_failures,
            suppress_warnings,
        }
    }

    /// The store this provider reads from.
    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    /// Map a store failure per the provider's strictness. Cancellation is
    /// never absorbed.
    fn absorb(&self, err: StoreError) -> Result<Vec<Version>> {
        if matches!(err, StoreError::Cancelled) {
            return Err(ProviderError::Cancelled);
        }
        if self.ignore_failures {
            if self.suppress_warnings {
                debug!(source = %self.source, "ignoring unreadable source: {err}");
            } else {
                warn!(source = %self.source, "ignoring unreadable source: {err}");
            }
            return Ok(Vec::new());
        }
        warn!(source = %self.source, "source failed: {err}");
        Err(ProviderError::SourceUnavailable {
            source_name: self.source.clone(),
            detail: err.to_string(),
        })
    }
}

impl DependencyProvider for FolderProvider {
    fn source(&self) -> &str {
        &self.source
    }

    fn is_remote(&self) -> bool {
        false
    }

    fn list_candidates(&self, id: &str, token: &CancellationToken) -> Result<Vec<Version>> {
        match self.store.find_by_id(id, token) {
            Ok(packages) => {
                let mut versions: Vec<Version> =
                    packages.into_iter().map(|p| p.version).collect();
                versions.sort();
                Ok(versions)
            }
            Err(err) => self.absorb(err),
        }
    }
}
