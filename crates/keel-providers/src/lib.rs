//! Dependency providers for keel restore sessions.
//!
//! A restore sees packages through providers: one per local folder (the
//! global packages folder plus any fallback folders) and one per remote
//! source. Building them is cheap but wants sharing, so a process keeps a
//! [`ProviderCache`] that memoizes stores and providers by folder identity
//! and by source value, and hands out assembled [`ProviderSet`]s per
//! request. The remote side stays abstract: callers inject a
//! [`RemoteProviderFactory`] and this crate never speaks a feed protocol.

pub mod cache;
pub mod context;
pub mod error;
pub mod provider;
pub mod set;
pub mod source;

// Re-exports for convenience.
pub use cache::ProviderCache;
pub use context::CacheContext;
pub use error::{ProviderError, Result};
pub use provider::{DependencyProvider, FolderProvider, RemoteProviderFactory};
pub use set::ProviderSet;
pub use source::PackageSource;
