//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a [`CryptoError`].
///
/// Callers that only need to know whether an operation could not be attempted
/// (validation), could not reach its inputs (storage) or could not interpret
/// them (decode) match on this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input, rejected before any work was done
    Validation,
    /// A file was missing, unreadable or unwritable
    Storage,
    /// Data was present but could not be decoded
    Decode,
}

/// Errors produced by keylab operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Identity attributes failed validation
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// Key has an unusable length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Cipher key has no bytes
    #[error("key must not be empty")]
    EmptyKey,

    /// No key file at the configured location
    #[error("key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    /// The key file holds the other kind of record
    #[error("key file holds a different kind of key (expected {expected})")]
    KeyKindMismatch {
        /// Kind of record that was requested
        expected: &'static str,
    },

    /// Document to sign or verify does not exist
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// Signature file next to a document does not exist
    #[error("signature file not found: {}", .0.display())]
    SignatureNotFound(PathBuf),

    /// Filesystem failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Text encoding (base-64, hex) could not be decoded
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Decrypted bytes are not valid UTF-8
    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,

    /// Signature text is not a hex integer
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Key file exists but its contents are malformed
    #[error("corrupt key file {}: {reason}", path.display())]
    CorruptKeyFile {
        /// Key file path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

impl CryptoError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentity(_) | Self::InvalidKeyLength { .. } | Self::EmptyKey => {
                ErrorKind::Validation
            }
            Self::KeyNotFound(_)
            | Self::KeyKindMismatch { .. }
            | Self::DocumentNotFound(_)
            | Self::SignatureNotFound(_)
            | Self::Io { .. } => ErrorKind::Storage,
            Self::InvalidEncoding(_)
            | Self::InvalidUtf8
            | Self::InvalidSignature(_)
            | Self::CorruptKeyFile { .. } => ErrorKind::Decode,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
