//! Shared per-session cache controls.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Caching behavior shared by every provider in one restore session.
///
/// The context owns a unique scratch directory for staged downloads,
/// created on first use. Closing removes it; close runs at most once no
/// matter how many handles exist, and dropping the context closes it as a
/// last resort.
#[derive(Debug, Default)]
pub struct CacheContext {
    no_cache: bool,
    ignore_failed_sources: bool,
    session_dir: OnceLock<PathBuf>,
    closed: AtomicBool,
}

impl CacheContext {
    /// Context with default caching behavior.
    pub fn new() -> Self {
        CacheContext::default()
    }

    /// Bypass previously cached feed responses for this session.
    pub fn with_no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Treat unreachable sources as empty instead of failing the restore.
    pub fn with_ignore_failed_sources(mut self) -> Self {
        self.ignore_failed_sources = true;
        self
    }

    /// Whether cached feed responses are bypassed.
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// Whether unreachable sources are tolerated.
    pub fn ignore_failed_sources(&self) -> bool {
        self.ignore_failed_sources
    }

    /// Scratch directory for staged downloads, created on first use.
    pub fn session_dir(&self) -> Result<&Path> {
        if let Some(dir) = self.session_dir.get() {
            return Ok(dir);
        }
        let candidate = std::env::temp_dir()
            .join("keel-restore")
            .join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&candidate)?;
        let dir = self.session_dir.get_or_init(|| candidate.clone());
        if *dir != candidate {
            // Lost the creation race; drop the extra directory.
            let _ = std::fs::remove_dir_all(&candidate);
        }
        Ok(dir)
    }

    /// Remove the scratch directory if one was created.
    ///
    /// Runs at most once; later calls are no-ops. Cleanup failures are
    /// logged, never raised.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(dir) = self.session_dir.get() {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                debug!(dir = %dir.display(), "scratch cleanup failed: {e}");
            }
        }
    }
}

impl Drop for CacheContext {
    fn drop(&mut self) {
        self.close();
    }
}
