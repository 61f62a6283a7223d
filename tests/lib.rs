//! Shared fixtures for keylab integration tests.

use std::fs;
use std::path::PathBuf;

use keylab_crypto::keystore::KeyStore;
use tempfile::TempDir;

/// Signing identity with published reference keys
pub const IVAN: (&str, &str, &str) = ("Ivan", "15031995", "x");

/// Cipher identity with a published reference key
pub const A_AT_B: (&str, &str) = ("a@b.com", "01011990");

/// Scratch directory laid out like a user's working directory
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Create an empty sandbox
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Path of `name` inside the sandbox
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file and return its path
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    /// Store at the default signing key location
    #[must_use]
    pub fn signing_store(&self) -> KeyStore {
        KeyStore::new(self.path("keys.json"))
    }

    /// Store at the default symmetric key location
    #[must_use]
    pub fn symmetric_store(&self) -> KeyStore {
        KeyStore::new(self.path("symmetric_key.json"))
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
