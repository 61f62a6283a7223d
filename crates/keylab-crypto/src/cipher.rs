//! Repeating-key XOR message cipher.
//!
//! ```text
//! ciphertext = encode(message[i] XOR key[i mod len(key)])
//! ```
//!
//! There is no nonce, no authentication tag and no integrity check. Flipping
//! a ciphertext bit flips the same plaintext bit, and the result may still be
//! valid UTF-8.

use std::fmt;

use crate::CryptoError;
use crate::codec::{Base64Codec, TextCodec};

/// Encoded ciphertext text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(String);

impl Ciphertext {
    /// Wrap ciphertext text read from elsewhere.
    ///
    /// Surrounding whitespace is dropped; the text is not validated until
    /// decryption.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_string())
    }

    /// The encoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// XOR `data` against `key` repeated to its length.
///
/// The operation is its own inverse. `key` must not be empty.
#[must_use]
pub fn xor_fold(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect()
}

fn require_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::EmptyKey);
    }
    Ok(())
}

/// XOR cipher over an injected text codec.
#[derive(Debug, Clone, Default)]
pub struct SymmetricCipher<C = Base64Codec> {
    codec: C,
}

impl SymmetricCipher<Base64Codec> {
    /// Cipher producing base-64 text.
    #[must_use]
    pub fn base64() -> Self {
        Self::new(Base64Codec)
    }
}

impl<C: TextCodec> SymmetricCipher<C> {
    /// Create a cipher using `codec` for the text form.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Encrypt a message.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyKey`] if `key` is empty.
    pub fn encrypt(&self, message: impl AsRef<[u8]>, key: &[u8]) -> Result<Ciphertext, CryptoError> {
        require_key(key)?;
        let message = message.as_ref();
        let folded = xor_fold(message, key);

        tracing::debug!(len = message.len(), "encrypted message");
        Ok(Ciphertext(self.codec.encode(&folded)))
    }

    /// Decrypt ciphertext text back to a UTF-8 message.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::EmptyKey`] if `key` is empty
    /// - [`CryptoError::InvalidEncoding`] if the text does not decode
    /// - [`CryptoError::InvalidUtf8`] if the decrypted bytes are not UTF-8,
    ///   which is the usual symptom of a wrong key
    pub fn decrypt(&self, ciphertext: &str, key: &[u8]) -> Result<String, CryptoError> {
        require_key(key)?;
        let encrypted = self.codec.decode(ciphertext)?;
        let plaintext = xor_fold(&encrypted, key);

        String::from_utf8(plaintext).map_err(|_| {
            tracing::debug!(len = encrypted.len(), "decrypted bytes are not UTF-8");
            CryptoError::InvalidUtf8
        })
    }

    /// Decrypt a [`Ciphertext`].
    ///
    /// # Errors
    ///
    /// See [`decrypt`](Self::decrypt).
    pub fn decrypt_ciphertext(&self, ciphertext: &Ciphertext, key: &[u8]) -> Result<String, CryptoError> {
        self.decrypt(ciphertext.as_str(), key)
    }
}
