//! Toy XOR signatures.
//!
//! A signature is the document digest, read as a 256-bit big-endian integer,
//! XORed with the private key:
//!
//! ```text
//! signature = hex(int(digest(document)) XOR private_key)
//! ```
//!
//! Verification undoes the XOR and compares the result, zero-padded to 64
//! hex characters, against the digest of the document as it is now.
//!
//! ## Security Properties
//!
//! There are none beyond "the digest changed". Anyone holding one
//! `(document, signature)` pair can sign any other document without the key:
//!
//! ```text
//! s2 = s1 XOR h1 XOR h2
//! ```
//!
//! That weakness is part of the lesson and is kept as is.
//!
//! ## Usage
//!
//! ```
//! use keylab_crypto::signatures::SignatureEngine;
//!
//! let engine = SignatureEngine::sha256();
//! let signature = engine.sign(b"hello", 42);
//!
//! assert!(engine.verify(b"hello", &signature, 42));
//! assert!(!engine.verify(b"hellp", &signature, 42));
//! ```

use std::fmt;

use crate::CryptoError;
use crate::digest::{DIGEST_HEX_LEN, DIGEST_SIZE, DigestAlgorithm, HashOutput, Sha256Digest, to_hex};

/// Offset of the bytes a `u64` key touches inside a digest.
const KEY_OFFSET: usize = DIGEST_SIZE - 8;

/// Signature as a canonical lowercase hex integer.
///
/// Canonical form has no `0x` prefix and no leading zeros; zero is `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// Parse signature text.
    ///
    /// Surrounding whitespace and a `0x` prefix are accepted, as are
    /// uppercase digits and leading zeros.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if no hex digits remain or a
    /// non-hex character is present.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(CryptoError::InvalidSignature("empty signature".into()));
        }
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CryptoError::InvalidSignature(format!(
                "unexpected character {c:?}"
            )));
        }

        Ok(Self::canonical(&digits.to_ascii_lowercase()))
    }

    /// Build from a big-endian magnitude.
    fn from_be_bytes(bytes: &[u8]) -> Self {
        Self::canonical(&hex::encode(bytes))
    }

    fn canonical(lower_hex: &str) -> Self {
        let stripped = lower_hex.trim_start_matches('0');
        if stripped.is_empty() {
            Self("0".to_string())
        } else {
            Self(stripped.to_string())
        }
    }

    /// Canonical hex text, as written to signature files.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Widen to a 256-bit big-endian value, or `None` if it does not fit.
    fn to_be_bytes(&self) -> Option<HashOutput> {
        if self.0.len() > DIGEST_HEX_LEN {
            return None;
        }
        let padded = format!("{:0>width$}", self.0, width = DIGEST_HEX_LEN);
        let mut out = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(padded, &mut out).ok()?;
        Some(out)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// XOR `private_key` into the low-order end of a 256-bit big-endian value.
fn fold_key(value: &mut HashOutput, private_key: u64) {
    for (byte, key_byte) in value[KEY_OFFSET..].iter_mut().zip(private_key.to_be_bytes()) {
        *byte ^= key_byte;
    }
}

/// Signs and verifies documents over an injected digest.
#[derive(Debug, Clone, Default)]
pub struct SignatureEngine<D = Sha256Digest> {
    digest: D,
}

impl SignatureEngine<Sha256Digest> {
    /// Engine over SHA-256.
    #[must_use]
    pub fn sha256() -> Self {
        Self::new(Sha256Digest)
    }
}

impl<D: DigestAlgorithm> SignatureEngine<D> {
    /// Create an engine using `digest`.
    #[must_use]
    pub fn new(digest: D) -> Self {
        Self { digest }
    }

    /// The digest in use.
    #[must_use]
    pub fn algorithm(&self) -> &D {
        &self.digest
    }

    /// Digest of a document.
    #[must_use]
    pub fn document_digest(&self, content: &[u8]) -> HashOutput {
        self.digest.digest(content)
    }

    /// Digest of a document as 64 lowercase hex characters.
    #[must_use]
    pub fn document_digest_hex(&self, content: &[u8]) -> String {
        self.digest.digest_hex(content)
    }

    /// Sign a document.
    #[must_use]
    pub fn sign(&self, content: &[u8], private_key: u64) -> Signature {
        self.sign_digest(&self.document_digest(content), private_key)
    }

    /// Sign an already computed document digest.
    #[must_use]
    pub fn sign_digest(&self, digest: &HashOutput, private_key: u64) -> Signature {
        let mut value = *digest;
        fold_key(&mut value, private_key);
        Signature::from_be_bytes(&value)
    }

    /// Check `signature` against a document.
    ///
    /// Returns `false` both for a modified document and for a signature made
    /// with another key.
    #[must_use]
    pub fn verify(&self, content: &[u8], signature: &Signature, private_key: u64) -> bool {
        self.verify_digest(&self.document_digest(content), signature, private_key)
    }

    /// Check `signature` against an already computed document digest.
    #[must_use]
    pub fn verify_digest(&self, digest: &HashOutput, signature: &Signature, private_key: u64) -> bool {
        // Anything wider than the digest keeps its high digits after the fold
        // and can never equal a 64-character digest.
        let Some(mut candidate) = signature.to_be_bytes() else {
            tracing::debug!(len = signature.as_str().len(), "signature wider than digest");
            return false;
        };
        fold_key(&mut candidate, private_key);

        let valid = hex::encode(candidate) == to_hex(digest);
        if valid {
            tracing::debug!(algorithm = self.digest.name(), "signature verified");
        } else {
            tracing::debug!(algorithm = self.digest.name(), "signature does not match document");
        }
        valid
    }

    /// Parse `signature_text` and verify it.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if the text is not a hex
    /// integer. `Ok(false)` means the check ran and failed.
    pub fn verify_hex(&self, content: &[u8], signature_text: &str, private_key: u64) -> Result<bool, CryptoError> {
        let signature = Signature::from_hex(signature_text)?;
        Ok(self.verify(content, &signature, private_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Blake3Digest;
    use crate::keys::MODULO;
    use std::io;
    use std::sync::{Arc, Mutex};

    const HELLO_SIG_42: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b980e";

    #[test]
    fn test_sign_hello_with_42() {
        let engine = SignatureEngine::sha256();
        let signature = engine.sign(b"hello", 42);

        assert_eq!(signature.as_str(), HELLO_SIG_42);
        assert!(engine.verify(b"hello", &signature, 42));
        assert!(!engine.verify(b"hellp", &signature, 42));
    }

    #[test]
    fn test_wrong_key_fails() {
        let engine = SignatureEngine::sha256();
        let signature = engine.sign(b"hello", 42);
        assert!(!engine.verify(b"hello", &signature, 43));
    }

    #[test]
    fn test_leading_zero_digest_roundtrip() {
        // sha256("286") starts with "00"; the signature loses those digits
        let engine = SignatureEngine::sha256();
        let signature = engine.sign(b"286", 42);

        assert_eq!(
            signature.as_str(),
            "328ce57bbc14b33bd6695bc8eb32cdf2fb5f3a7d89ec14a42825e15d39df4a"
        );
        assert!(engine.verify(b"286", &signature, 42));
    }

    #[test]
    fn test_tamper_detection() {
        let engine = SignatureEngine::sha256();
        let original = b"The quick brown fox".to_vec();
        let signature = engine.sign(&original, 123_456);

        let mut appended = original.clone();
        appended.push(b'!');

        let mut flipped = original.clone();
        flipped[3] ^= 0x01;

        let truncated = original[..original.len() - 1].to_vec();

        for mutated in [appended, flipped, truncated] {
            assert!(!engine.verify(&mutated, &signature, 123_456));
        }
    }

    #[test]
    fn test_key_range_edges() {
        let engine = SignatureEngine::sha256();
        for key in [0, 1, MODULO - 1] {
            let signature = engine.sign(b"edge", key);
            assert!(engine.verify(b"edge", &signature, key));
        }
    }

    #[test]
    fn test_zero_key_signature_is_digest() {
        let engine = SignatureEngine::sha256();
        let signature = engine.sign(b"hello", 0);
        assert_eq!(
            signature.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_forgery_from_known_pair() {
        let engine = SignatureEngine::sha256();
        let key = 777_777;
        let s1 = engine.sign(b"pay 10", key);

        // s2 = s1 XOR h1 XOR h2, computed without the key
        let h1 = engine.document_digest(b"pay 10");
        let h2 = engine.document_digest(b"pay 10000");
        let mut forged = s1.to_be_bytes().unwrap();
        for ((byte, a), b) in forged.iter_mut().zip(h1).zip(h2) {
            *byte ^= a ^ b;
        }
        let forged = Signature::from_be_bytes(&forged);

        assert!(engine.verify(b"pay 10000", &forged, key));
    }

    #[test]
    fn test_parse_accepts_prefix_case_and_padding() {
        let engine = SignatureEngine::sha256();
        for text in [
            format!("0x{HELLO_SIG_42}"),
            HELLO_SIG_42.to_uppercase(),
            format!("0000{HELLO_SIG_42}"),
            format!("  {HELLO_SIG_42}\n"),
        ] {
            assert!(engine.verify_hex(b"hello", &text, 42).unwrap(), "{text}");
        }
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        for text in ["", "0x", "   ", "xyz", "12 34", "-1f"] {
            assert!(
                matches!(Signature::from_hex(text), Err(CryptoError::InvalidSignature(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_canonical_zero() {
        assert_eq!(Signature::from_hex("0000").unwrap().as_str(), "0");
        assert_eq!(Signature::from_hex("0x0").unwrap().to_string(), "0");
    }

    #[test]
    fn test_oversized_signature_is_invalid_not_error() {
        let engine = SignatureEngine::sha256();
        let wide = format!("1{HELLO_SIG_42}");
        assert!(!engine.verify_hex(b"hello", &wide, 42).unwrap());
    }

    #[test]
    fn test_verify_digest_matches_verify() {
        let engine = SignatureEngine::new(Blake3Digest);
        let digest = engine.document_digest(b"streamed");
        let signature = engine.sign_digest(&digest, 99);

        assert!(engine.verify(b"streamed", &signature, 99));
        assert!(engine.verify_digest(&digest, &signature, 99));
        assert_eq!(engine.document_digest_hex(b"streamed"), to_hex(&digest));
    }

    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_forged_verdict_is_silent_at_warn_level() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || CaptureWriter(Arc::clone(&sink)))
            .finish();

        let engine = SignatureEngine::sha256();
        let signature = engine.sign(b"hello", 42);
        let wide = Signature::from_hex(&format!("1{HELLO_SIG_42}")).unwrap();
        let verdicts = tracing::subscriber::with_default(subscriber, || {
            [
                engine.verify(b"hellp", &signature, 42),
                engine.verify(b"hello", &wide, 42),
            ]
        });

        assert_eq!(verdicts, [false, false]);
        assert!(captured.lock().unwrap().is_empty());
    }
}
