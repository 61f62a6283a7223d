//! Deterministic key derivation from identity attributes.
//!
//! ## Signing keys
//!
//! ```text
//! h           = digest(name || birthdate || secret_word)
//! private_key = int(h) mod MODULO
//! public_key  = private_key * MULTIPLIER mod MODULO
//! ```
//!
//! ## Symmetric keys
//!
//! ```text
//! key = digest(email || birthdate)        (all 32 bytes)
//! ```
//!
//! The same inputs always produce the same keys, across runs and machines.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;
use crate::digest::{DIGEST_SIZE, DigestAlgorithm, HashOutput, Sha256Digest, is_digest_hex, to_hex};
use crate::identity::{CipherIdentity, SigningIdentity};

/// Modulus of the toy key space.
pub const MODULO: u64 = 1_000_007;

/// Public key = private key * `MULTIPLIER` mod [`MODULO`].
pub const MULTIPLIER: u64 = 7;

/// Symmetric key size in bytes.
pub const SYMMETRIC_KEY_SIZE: usize = DIGEST_SIZE;

/// Signing key pair derived from a [`SigningIdentity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: u64,
    public_key: u64,
    digest_hex: String,
}

impl KeyPair {
    /// Rebuild a pair from its private key and identity digest.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidIdentity`] if the private key is outside
    /// `[0, MODULO)` or `digest_hex` is not 64 lowercase hex characters.
    pub fn from_private_key(private_key: u64, digest_hex: impl Into<String>) -> Result<Self, CryptoError> {
        let digest_hex = digest_hex.into();
        if private_key >= MODULO {
            return Err(CryptoError::InvalidIdentity(format!(
                "private key {private_key} out of range (must be below {MODULO})"
            )));
        }
        if !is_digest_hex(&digest_hex) {
            return Err(CryptoError::InvalidIdentity(
                "identity digest must be 64 lowercase hex characters".into(),
            ));
        }

        Ok(Self {
            private_key,
            public_key: public_key_for(private_key),
            digest_hex,
        })
    }

    /// Private key in `[0, MODULO)`.
    #[must_use]
    pub fn private_key(&self) -> u64 {
        self.private_key
    }

    /// Public key in `[0, MODULO)`.
    #[must_use]
    pub fn public_key(&self) -> u64 {
        self.public_key
    }

    /// Hex digest of the identity the pair was derived from.
    #[must_use]
    pub fn digest_hex(&self) -> &str {
        &self.digest_hex
    }

    /// Whether the public key still matches the private key.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        is_consistent_pair(self.private_key, self.public_key)
    }
}

/// Public key matching `private_key`.
#[must_use]
pub fn public_key_for(private_key: u64) -> u64 {
    (private_key % MODULO) * MULTIPLIER % MODULO
}

/// Whether `public_key` is the one `private_key` maps to.
#[must_use]
pub fn is_consistent_pair(private_key: u64, public_key: u64) -> bool {
    private_key < MODULO && public_key_for(private_key) == public_key
}

/// Reduce a big-endian 256-bit integer modulo `modulus`.
fn reduce_digest(digest: &HashOutput, modulus: u64) -> u64 {
    digest
        .iter()
        .fold(0u64, |acc, &byte| (acc * 256 + u64::from(byte)) % modulus)
}

/// 32-byte key for the repeating-key XOR cipher.
///
/// Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; SYMMETRIC_KEY_SIZE],
    owner: String,
}

impl SymmetricKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn new(key: [u8; SYMMETRIC_KEY_SIZE], owner: impl Into<String>) -> Self {
        Self {
            key,
            owner: owner.into(),
        }
    }

    /// Parse a hex-encoded key as stored in a key file.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if `key_hex` is not hex, or
    /// [`CryptoError::InvalidKeyLength`] if it does not decode to 32 bytes.
    pub fn from_hex(key_hex: &str, owner: impl Into<String>) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(key_hex).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        if bytes.len() != SYMMETRIC_KEY_SIZE {
            let actual = bytes.len();
            bytes.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: SYMMETRIC_KEY_SIZE,
                actual,
            });
        }

        let mut key = [0u8; SYMMETRIC_KEY_SIZE];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self::new(key, owner))
    }

    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.key
    }

    /// Lowercase hex rendering of the key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Owner the key was derived for.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("owner", &self.owner)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.owner == other.owner
    }
}

impl Eq for SymmetricKey {}

/// Key derivation over an injected digest.
#[derive(Debug, Clone, Default)]
pub struct KeyDeriver<D = Sha256Digest> {
    digest: D,
}

impl<D: DigestAlgorithm> KeyDeriver<D> {
    /// Create a deriver using `digest`.
    #[must_use]
    pub fn new(digest: D) -> Self {
        Self { digest }
    }

    /// Derive the signing key pair for `identity`.
    #[must_use]
    pub fn derive_signing_keys(&self, identity: &SigningIdentity) -> KeyPair {
        let digest = self.digest.digest(identity.key_material().as_bytes());
        let private_key = reduce_digest(&digest, MODULO);

        tracing::debug!(
            owner = identity.name(),
            algorithm = self.digest.name(),
            "derived signing key pair"
        );

        KeyPair {
            private_key,
            public_key: public_key_for(private_key),
            digest_hex: to_hex(&digest),
        }
    }

    /// Derive the symmetric key for `identity`.
    #[must_use]
    pub fn derive_symmetric_key(&self, identity: &CipherIdentity) -> SymmetricKey {
        let key = self.digest.digest(identity.key_material().as_bytes());

        tracing::debug!(
            email = identity.email(),
            algorithm = self.digest.name(),
            "derived symmetric key"
        );

        SymmetricKey::new(key, identity.email())
    }
}

/// Validate the identity and derive its signing key pair with SHA-256.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidIdentity`] if validation fails; nothing is
/// derived in that case.
pub fn derive_signing_keys(name: &str, birthdate: &str, secret_word: &str) -> Result<KeyPair, CryptoError> {
    let identity = SigningIdentity::new(name, birthdate, secret_word)?;
    Ok(KeyDeriver::new(Sha256Digest).derive_signing_keys(&identity))
}

/// Validate the identity and derive its symmetric key with SHA-256.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidIdentity`] if either field is blank.
pub fn derive_symmetric_key(email: &str, birthdate: &str) -> Result<SymmetricKey, CryptoError> {
    let identity = CipherIdentity::new(email, birthdate)?;
    Ok(KeyDeriver::new(Sha256Digest).derive_symmetric_key(&identity))
}
