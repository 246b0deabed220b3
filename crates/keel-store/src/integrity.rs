//! Archive integrity verification.
//!
//! Each installed archive may carry a sidecar file recording the SHA-512
//! of its bytes. Digests render as lowercase hex.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha512};

use crate::error::{Result, StoreError};

/// An archive hash (SHA-512 hex digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveHash(String);

impl ArchiveHash {
    /// Compute the SHA-512 hash of the given data.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(data);
        let result = hasher.finalize();
        ArchiveHash(hex_encode(&result))
    }

    /// Compute the hash of a file's contents.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = Sha512::new();
        let mut buf = [0u8; 8192];
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }
        Ok(ArchiveHash(hex_encode(&hasher.finalize())))
    }

    /// Read a recorded hash from a sidecar file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StoreError::HashFile {
            path: path.to_path_buf(),
            detail: format!("reading hash file: {e}"),
        })?;
        let digest = text.trim();
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StoreError::HashFile {
                path: path.to_path_buf(),
                detail: "not a hex digest".to_string(),
            });
        }
        Ok(ArchiveHash(digest.to_lowercase()))
    }

    /// Write the digest to a sidecar file.
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.0)?;
        Ok(())
    }

    /// Get the hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that the given data matches this hash.
    pub fn verify(&self, data: &[u8]) -> bool {
        ArchiveHash::compute(data) == *self
    }

    /// Verify that a file's contents match this hash.
    pub fn verify_file(&self, path: &Path) -> Result<bool> {
        Ok(ArchiveHash::from_file(path)? == *self)
    }
}

impl std::fmt::Display for ArchiveHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode bytes as lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
