//! Single-record JSON key files.
//!
//! A key file holds exactly one record, either a signing record:
//!
//! ```json
//! {
//!     "name": "Ivan",
//!     "private_key": 299910,
//!     "public_key": 99356,
//!     "private_key_hash": "4ff5e5aa50f4e930558786bf6aee4d7de97375b2e48e92677860acd303c6e2f4"
//! }
//! ```
//!
//! or a symmetric record:
//!
//! ```json
//! {
//!     "email": "a@b.com",
//!     "secret_key": "c581669dcd04d310059f4f587fde4c509998727845dd7a21c41ebd9ee9d0cd02"
//! }
//! ```
//!
//! Saving replaces the whole file atomically. Loading validates the record
//! before handing it out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;
use crate::files::write_atomic;
use crate::keys::{KeyPair, SymmetricKey};

/// Persisted signing key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningKeyRecord {
    /// Owner name
    pub name: String,
    /// Private key in `[0, MODULO)`
    pub private_key: u64,
    /// Public key matching `private_key`
    pub public_key: u64,
    /// Identity digest the keys came from
    pub private_key_hash: String,
}

impl SigningKeyRecord {
    /// Record for a freshly derived pair.
    #[must_use]
    pub fn new(name: impl Into<String>, pair: &KeyPair) -> Self {
        Self {
            name: name.into(),
            private_key: pair.private_key(),
            public_key: pair.public_key(),
            private_key_hash: pair.digest_hex().to_string(),
        }
    }

    /// Rebuild the key pair, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidIdentity`] if the private key is out of
    /// range, the hash is malformed, or the public key does not match.
    pub fn key_pair(&self) -> Result<KeyPair, CryptoError> {
        let pair = KeyPair::from_private_key(self.private_key, self.private_key_hash.clone())?;
        if pair.public_key() != self.public_key {
            return Err(CryptoError::InvalidIdentity(format!(
                "public key {} does not match private key",
                self.public_key
            )));
        }
        Ok(pair)
    }
}

/// Persisted symmetric key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct SymmetricKeyRecord {
    /// Owner e-mail
    pub email: String,
    /// Key bytes as 64 lowercase hex characters
    pub secret_key: String,
}

impl SymmetricKeyRecord {
    /// Record for a derived key.
    #[must_use]
    pub fn new(key: &SymmetricKey) -> Self {
        Self {
            email: key.owner().to_string(),
            secret_key: key.to_hex(),
        }
    }

    /// Decode the stored key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] or
    /// [`CryptoError::InvalidKeyLength`] if `secret_key` is not 32 hex bytes.
    pub fn symmetric_key(&self) -> Result<SymmetricKey, CryptoError> {
        SymmetricKey::from_hex(&self.secret_key, self.email.as_str())
    }
}

impl std::fmt::Debug for SymmetricKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKeyRecord")
            .field("email", &self.email)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Contents of a key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredKeyRecord {
    /// Signing key pair
    Signing(SigningKeyRecord),
    /// Symmetric cipher key
    Symmetric(SymmetricKeyRecord),
}

impl StoredKeyRecord {
    /// `"signing"` or `"symmetric"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Signing(_) => SIGNING_KIND,
            Self::Symmetric(_) => SYMMETRIC_KIND,
        }
    }

    /// Check the record's invariants.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the offending field.
    pub fn validate(&self) -> Result<(), CryptoError> {
        match self {
            Self::Signing(record) => record.key_pair().map(drop),
            Self::Symmetric(record) => record.symmetric_key().map(drop),
        }
    }
}

impl From<SigningKeyRecord> for StoredKeyRecord {
    fn from(record: SigningKeyRecord) -> Self {
        Self::Signing(record)
    }
}

impl From<SymmetricKeyRecord> for StoredKeyRecord {
    fn from(record: SymmetricKeyRecord) -> Self {
        Self::Symmetric(record)
    }
}

const SIGNING_KIND: &str = "signing";
const SYMMETRIC_KIND: &str = "symmetric";

/// Handle on one key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Key store backed by the file at `path`. Nothing is touched until the
    /// first operation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the key file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the key file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the stored record with `record`.
    ///
    /// On failure the previous file, if any, is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file cannot be written.
    pub fn save(&self, record: &StoredKeyRecord) -> Result<(), CryptoError> {
        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        record
            .serialize(&mut serializer)
            .map_err(|e| CryptoError::io(&self.path, io::Error::other(e)))?;

        let result = write_atomic(&self.path, &json);
        json.zeroize();
        result?;

        tracing::debug!(path = %self.path.display(), kind = record.kind(), "key record saved");
        Ok(())
    }

    /// Read and validate the stored record.
    ///
    /// Returns `Ok(None)` if there is no key file.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::Io`] if the file exists but cannot be read
    /// - [`CryptoError::CorruptKeyFile`] if it is not a valid record
    pub fn load(&self) -> Result<Option<StoredKeyRecord>, CryptoError> {
        let mut json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(self.corrupt("file is not UTF-8"));
            }
            Err(e) => return Err(CryptoError::io(&self.path, e)),
        };

        let parsed = serde_json::from_str::<StoredKeyRecord>(&json);
        json.zeroize();

        let record = parsed.map_err(|_| self.corrupt("not a signing or symmetric key record"))?;
        record.validate().map_err(|e| self.corrupt(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), kind = record.kind(), "key record loaded");
        Ok(Some(record))
    }

    /// Load a signing record.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyNotFound`] if there is no key file,
    /// [`CryptoError::KeyKindMismatch`] if it holds a symmetric key, or any
    /// error from [`load`](Self::load).
    pub fn load_signing(&self) -> Result<SigningKeyRecord, CryptoError> {
        match self.load()? {
            Some(StoredKeyRecord::Signing(record)) => Ok(record),
            Some(StoredKeyRecord::Symmetric(_)) => Err(CryptoError::KeyKindMismatch {
                expected: SIGNING_KIND,
            }),
            None => Err(CryptoError::KeyNotFound(self.path.clone())),
        }
    }

    /// Load a symmetric record.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyNotFound`] if there is no key file,
    /// [`CryptoError::KeyKindMismatch`] if it holds a signing key, or any
    /// error from [`load`](Self::load).
    pub fn load_symmetric(&self) -> Result<SymmetricKeyRecord, CryptoError> {
        match self.load()? {
            Some(StoredKeyRecord::Symmetric(record)) => Ok(record),
            Some(StoredKeyRecord::Signing(_)) => Err(CryptoError::KeyKindMismatch {
                expected: SYMMETRIC_KIND,
            }),
            None => Err(CryptoError::KeyNotFound(self.path.clone())),
        }
    }

    /// Delete the key file. Returns `false` if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Io`] if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<bool, CryptoError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "key file removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CryptoError::io(&self.path, e)),
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> CryptoError {
        let reason = reason.into();
        tracing::warn!(path = %self.path.display(), %reason, "rejected key file");
        CryptoError::CorruptKeyFile {
            path: self.path.clone(),
            reason,
        }
    }
}
