//! Memoizing provider construction.
//!
//! Stores and providers are shared across the restore requests of one
//! process. Maps are keyed by folder identity under a fixed policy, so on
//! a case-insensitive file system a lowercasing and a case-preserving
//! view of the same directory share one instance. Concurrent requests may
//! race to construct an entry; the first insert wins and the loser is
//! discarded, which costs nothing because construction performs no I/O.

use std::sync::Arc;

use dashmap::DashMap;

use keel_store::{FolderIdentity, FolderKey, LocalStore, PackageFolder};

use crate::context::CacheContext;
use crate::provider::{DependencyProvider, FolderProvider, RemoteProviderFactory};
use crate::set::ProviderSet;
use crate::source::PackageSource;

/// Process-wide cache of stores and providers.
pub struct ProviderCache {
    identity: FolderIdentity,
    stores: DashMap<FolderKey, Arc<LocalStore>>,
    folder_providers: DashMap<FolderKey, Arc<dyn DependencyProvider>>,
    remote_providers: DashMap<PackageSource, Arc<dyn DependencyProvider>>,
    remote_factory: Arc<dyn RemoteProviderFactory>,
}

impl ProviderCache {
    /// Cache keyed by the host file system's folder identity.
    pub fn new(remote_factory: Arc<dyn RemoteProviderFactory>) -> Self {
        ProviderCache::with_identity(FolderIdentity::host(), remote_factory)
    }

    /// Cache keyed by an explicit identity policy.
    pub fn with_identity(
        identity: FolderIdentity,
        remote_factory: Arc<dyn RemoteProviderFactory>,
    ) -> Self {
        ProviderCache {
            identity,
            stores: DashMap::new(),
            folder_providers: DashMap::new(),
            remote_providers: DashMap::new(),
            remote_factory,
        }
    }

    /// The folder identity policy this cache keys by.
    pub fn identity(&self) -> FolderIdentity {
        self.identity
    }

    /// Assemble the provider set for one restore request.
    ///
    /// Stores and providers already built for an identity-equal folder or
    /// an equal-valued source are reused. A folder first seen in the
    /// global role keeps its tolerant provider even when a later request
    /// lists it as a fallback, and vice versa.
    pub fn get_or_create(
        &self,
        global: &PackageFolder,
        fallback_folders: &[PackageFolder],
        sources: &[PackageSource],
        context: &Arc<CacheContext>,
    ) -> ProviderSet {
        let global_store = self.store(global);
        let mut local_providers = vec![self.folder_provider(global, true, context)];

        let mut fallbacks = Vec::new();
        for folder in fallback_folders {
            fallbacks.push(self.store(folder));
            local_providers.push(self.folder_provider(folder, false, context));
        }

        let remote_providers = sources
            .iter()
            .map(|source| self.remote_provider(source, context))
            .collect();

        ProviderSet::new(
            global_store,
            fallbacks,
            local_providers,
            remote_providers,
            Arc::clone(context),
        )
    }

    fn store(&self, folder: &PackageFolder) -> Arc<LocalStore> {
        let key = self.identity.key(folder);
        Arc::clone(
            self.stores
                .entry(key)
                .or_insert_with(|| Arc::new(LocalStore::new(folder.clone())))
                .value(),
        )
    }

    fn folder_provider(
        &self,
        folder: &PackageFolder,
        global_role: bool,
        context: &Arc<CacheContext>,
    ) -> Arc<dyn DependencyProvider> {
        let key = self.identity.key(folder);
        Arc::clone(
            self.folder_providers
                .entry(key)
                .or_insert_with(|| {
                    let store = self.store(folder);
                    if global_role {
                        Arc::new(FolderProvider::global(store))
                    } else {
                        Arc::new(FolderProvider::fallback(store, context))
                    }
                })
                .value(),
        )
    }

    fn remote_provider(
        &self,
        source: &PackageSource,
        context: &Arc<CacheContext>,
    ) -> Arc<dyn DependencyProvider> {
        Arc::clone(
            self.remote_providers
                .entry(source.clone())
                .or_insert_with(|| self.remote_factory.create(source, context))
                .value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct CountingFactory {
        built: AtomicUsize,
    }

    impl CountingFactory {
        fn new() -> Arc<Self> {
            Arc::new(CountingFactory {
                built: AtomicUsize::new(0),
            })
        }
    }

    impl RemoteProviderFactory for CountingFactory {
        fn create(
            &self,
            source: &PackageSource,
            _context: &Arc<CacheContext>,
        ) -> Arc<dyn DependencyProvider> {
            self.built.fetch_add(1, Ordering::SeqCst);
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
        ) -> crate::error::Result<Vec<Version>> {
            Ok(Vec::new())
        }
    }

    fn folder(path: &str, lowercase: bool) -> PackageFolder {
        PackageFolder::new(path, lowercase).unwrap()
    }

    fn cache(case_sensitive: bool) -> (ProviderCache, Arc<CountingFactory>) {
        let factory = CountingFactory::new();
        let cache = ProviderCache::with_identity(
            FolderIdentity::new(case_sensitive),
            Arc::clone(&factory) as Arc<dyn RemoteProviderFactory>,
        );
        (cache, factory)
    }

    #[test]
    fn identity_equal_folders_share_one_store() {
        let (cache, _) = cache(false);
        let context = Arc::new(CacheContext::new());

        let first = cache.get_or_create(&folder("/Global/Packages", true), &[], &[], &context);
        let second = cache.get_or_create(&folder("/global/packages", false), &[], &[], &context);

        assert!(Arc::ptr_eq(first.global_store(), second.global_store()));
        assert!(Arc::ptr_eq(
            &first.local_providers()[0],
            &second.local_providers()[0]
        ));
    }

    #[test]
    fn sensitive_policy_keeps_folders_apart() {
        let (cache, _) = cache(true);
        let context = Arc::new(CacheContext::new());

        let first = cache.get_or_create(&folder("/global", true), &[], &[], &context);
        let second = cache.get_or_create(&folder("/Global", true), &[], &[], &context);
        let third = cache.get_or_create(&folder("/global", false), &[], &[], &context);

        assert!(!Arc::ptr_eq(first.global_store(), second.global_store()));
        assert!(!Arc::ptr_eq(first.global_store(), third.global_store()));
    }

    #[test]
    fn first_role_fixes_a_folder_provider() {
        let (cache, _) = cache(false);
        let context = Arc::new(CacheContext::new());
        let shared = folder("/shared/packages", true);

        // Seen first as the global folder.
        let first = cache.get_or_create(&shared, &[], &[], &context);
        // Later listed as a fallback of a different global.
        let second = cache.get_or_create(
            &folder("/other/global", true),
            std::slice::from_ref(&shared),
            &[],
            &context,
        );

        assert!(Arc::ptr_eq(
            &first.local_providers()[0],
            &second.local_providers()[1]
        ));
    }

    #[test]
    fn remote_providers_keyed_by_source_value() {
        let (cache, factory) = cache(false);
        let context = Arc::new(CacheContext::new());
        let url = "https://pkg.example.com/v1";

        let sources = [PackageSource::new("main", url)];
        let first = cache.get_or_create(&folder("/g", true), &[], &sources, &context);

        // Equal-valued source built elsewhere reuses the provider.
        let again = [PackageSource::new("main", url)];
        let second = cache.get_or_create(&folder("/g", true), &[], &again, &context);

        assert!(Arc::ptr_eq(
            &first.remote_providers()[0],
            &second.remote_providers()[0]
        ));
        assert_eq!(factory.built.load(Ordering::SeqCst), 1);

        let other = [PackageSource::new("mirror", "https://mirror.example.com/v1")];
        cache.get_or_create(&folder("/g", true), &[], &other, &context);
        assert_eq!(factory.built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_requests_converge_on_one_store() {
        let (cache, _) = cache(false);
        let context = Arc::new(CacheContext::new());

        let stores: Vec<Arc<LocalStore>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_create(&folder("/racing/global", true), &[], &[], &context)
                            .global_store()
                            .clone()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
