//! Aggregated providers for one restore session.

use std::sync::Arc;

use keel_store::{LocalStore, PackageFolder};

use crate::context::CacheContext;
use crate::provider::{DependencyProvider, FolderProvider, RemoteProviderFactory};
use crate::source::PackageSource;

/// Everything the resolver needs to see packages: the global store, the
/// fallback stores, and the ordered provider lists.
pub struct ProviderSet {
    global: Arc<LocalStore>,
    fallbacks: Vec<Arc<LocalStore>>,
    local_providers: Vec<Arc<dyn DependencyProvider>>,
    remote_providers: Vec<Arc<dyn DependencyProvider>>,
    cache_context: Arc<CacheContext>,
}

impl ProviderSet {
    /// Assemble a set from already-built parts.
    ///
    /// `local_providers` must start with the global folder's provider,
    /// followed by fallback providers in configuration order.
    pub fn new(
        global: Arc<LocalStore>,
        fallbacks: Vec<Arc<LocalStore>>,
        local_providers: Vec<Arc<dyn DependencyProvider>>,
        remote_providers: Vec<Arc<dyn DependencyProvider>>,
        cache_context: Arc<CacheContext>,
    ) -> Self {
        ProviderSet {
            global,
            fallbacks,
            local_providers,
            remote_providers,
            cache_context,
        }
    }

    /// Build a set directly, without memoization.
    pub fn create(
        global: &PackageFolder,
        fallback_folders: &[PackageFolder],
        sources: &[PackageSource],
        remote_factory: &dyn RemoteProviderFactory,
        context: Arc<CacheContext>,
    ) -> Self {
        let global_store = Arc::new(LocalStore::new(global.clone()));
        let mut local_providers: Vec<Arc<dyn DependencyProvider>> =
            vec![Arc::new(FolderProvider::global(Arc::clone(&global_store)))];

        let mut fallbacks = Vec::new();
        for folder in fallback_folders {
            let store = Arc::new(LocalStore::new(folder.clone()));
            local_providers.push(Arc::new(FolderProvider::fallback(
                Arc::clone(&store),
                &context,
            )));
            fallbacks.push(store);
        }

        let remote_providers = sources
            .iter()
            .map(|source| remote_factory.create(source, &context))
            .collect();

        ProviderSet::new(
            global_store,
            fallbacks,
            local_providers,
            remote_providers,
            context,
        )
    }

    /// The global packages store.
    pub fn global_store(&self) -> &Arc<LocalStore> {
        &self.global
    }

    /// Fallback stores in configuration order.
    pub fn fallback_stores(&self) -> &[Arc<LocalStore>] {
        &self.fallbacks
    }

    /// Local providers: the global folder first, then fallbacks.
    pub fn local_providers(&self) -> &[Arc<dyn DependencyProvider>] {
        &self.local_providers
    }

    /// Remote providers in source order.
    pub fn remote_providers(&self) -> &[Arc<dyn DependencyProvider>] {
        &self.remote_providers
    }

    /// The session's shared cache context.
    pub fn cache_context(&self) -> &Arc<CacheContext> {
        &self.cache_context
    }

    /// End the session: release the cache context's scratch space.
    ///
    /// The close itself is one-shot, so disposing one of several sets
    /// sharing a context closes it for all of them.
    pub fn dispose(self) {
        self.cache_context.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    struct NoRemotes;

    impl RemoteProviderFactory for NoRemotes {
        fn create(
            &self,
            source: &PackageSource,
            _context: &Arc<CacheContext>,
        ) -> Arc<dyn DependencyProvider> {
            Arc::new(StubRemote {
                source: source.url().to_string(),
            })
        }
    }

    struct StubRemote {
        source: String,
    }

    impl DependencyProvider for StubRemote {
        fn source(&self) -> &str {
            &self.source
        }
        fn is_remote(&self) -> bool {
            true
        }
        fn list_candidates(
            &self,
            _id: &str,
            _token: &CancellationToken,
        ) -> crate::error::Result<Vec<semver::Version>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn create_orders_local_providers_global_first() {
        let global_dir = tempfile::tempdir().unwrap();
        let fallback_dir = tempfile::tempdir().unwrap();

        let global = PackageFolder::new(global_dir.path(), true).unwrap();
        let fallback = PackageFolder::new(fallback_dir.path(), true).unwrap();
        let sources = [PackageSource::new("main", "https://pkg.example.com/v1")];

        let set = ProviderSet::create(
            &global,
            std::slice::from_ref(&fallback),
            &sources,
            &NoRemotes,
            Arc::new(CacheContext::new()),
        );

        assert_eq!(set.local_providers().len(), 2);
        assert_eq!(
            set.local_providers()[0].source(),
            global_dir.path().display().to_string()
        );
        assert_eq!(
            set.local_providers()[1].source(),
            fallback_dir.path().display().to_string()
        );
        assert_eq!(set.fallback_stores().len(), 1);
        assert_eq!(set.remote_providers().len(), 1);
        assert!(set.remote_providers()[0].is_remote());
    }

    #[test]
    fn dispose_closes_the_session_scratch() {
        let global_dir = tempfile::tempdir().unwrap();
        let global = PackageFolder::new(global_dir.path(), true).unwrap();
        let context = Arc::new(CacheContext::new());
        let scratch = context.session_dir().unwrap().to_path_buf();

        let set = ProviderSet::create(&global, &[], &[], &NoRemotes, Arc::clone(&context));
        assert!(scratch.is_dir());

        set.dispose();
        assert!(!scratch.exists());
    }
}
