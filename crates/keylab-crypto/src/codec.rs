//! Reversible byte-to-text encodings for ciphertext.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::CryptoError;

/// Lossless text encoding of arbitrary bytes.
pub trait TextCodec {
    /// Encode bytes as text.
    fn encode(&self, bytes: &[u8]) -> String;

    /// Decode text produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if `text` is malformed.
    fn decode(&self, text: &str) -> Result<Vec<u8>, CryptoError>;
}

/// Standard-alphabet, padded base-64. Decoding is strict apart from
/// surrounding whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64Codec;

impl TextCodec for Base64Codec {
    fn encode(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        STANDARD
            .decode(text.trim())
            .map_err(|e| CryptoError::InvalidEncoding(format!("base64: {e}")))
    }
}

/// Lowercase hex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexCodec;

impl TextCodec for HexCodec {
    fn encode(&self, bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        hex::decode(text.trim()).map_err(|e| CryptoError::InvalidEncoding(format!("hex: {e}")))
    }
}
