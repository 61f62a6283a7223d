//! One-way 256-bit digests.
//!
//! Provides:
//! - The [`DigestAlgorithm`] capability that key derivation and signing are
//!   written against
//! - SHA-256 (the default) and BLAKE3 implementations
//! - Incremental hashing of large documents with progress reporting

use std::fmt;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

/// Digest size in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Length of a digest rendered as hex.
pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE * 2;

/// Raw digest output (32 bytes).
pub type HashOutput = [u8; DIGEST_SIZE];

/// Chunk size used when hashing from a reader.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A deterministic 256-bit one-way hash function.
///
/// Implementations must be pure: the same input always yields the same
/// output.
pub trait DigestAlgorithm {
    /// Short lowercase algorithm name.
    fn name(&self) -> &'static str;

    /// Hash `data` in one shot.
    fn digest(&self, data: &[u8]) -> HashOutput;

    /// Start an incremental computation.
    fn streaming(&self) -> Box<dyn StreamingDigest>;

    /// Hash `data` and render it as 64 lowercase hex characters.
    fn digest_hex(&self, data: &[u8]) -> String {
        to_hex(&self.digest(data))
    }
}

/// An in-progress incremental digest.
pub trait StreamingDigest {
    /// Feed more data.
    fn update(&mut self, data: &[u8]);

    /// Consume the state and produce the digest.
    fn finalize(self: Box<Self>) -> HashOutput;
}

/// SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Digest;

impl DigestAlgorithm for Sha256Digest {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, data: &[u8]) -> HashOutput {
        sha2::Sha256::digest(data).into()
    }

    fn streaming(&self) -> Box<dyn StreamingDigest> {
        Box::new(Sha256Stream(sha2::Sha256::new()))
    }
}

struct Sha256Stream(sha2::Sha256);

impl StreamingDigest for Sha256Stream {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> HashOutput {
        self.0.finalize().into()
    }
}

/// BLAKE3 with 32-byte output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Digest;

impl DigestAlgorithm for Blake3Digest {
    fn name(&self) -> &'static str {
        "blake3"
    }

    fn digest(&self, data: &[u8]) -> HashOutput {
        *blake3::hash(data).as_bytes()
    }

    fn streaming(&self) -> Box<dyn StreamingDigest> {
        Box::new(Blake3Stream(blake3::Hasher::new()))
    }
}

struct Blake3Stream(blake3::Hasher);

impl StreamingDigest for Blake3Stream {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> HashOutput {
        *self.0.finalize().as_bytes()
    }
}

/// Run-time selection of a digest algorithm.
///
/// Keys derived under one algorithm do not match keys derived under the
/// other, so a key file is only usable with the algorithm that created it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// SHA-256
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

impl DigestAlgorithm for DigestKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => Sha256Digest.name(),
            Self::Blake3 => Blake3Digest.name(),
        }
    }

    fn digest(&self, data: &[u8]) -> HashOutput {
        match self {
            Self::Sha256 => Sha256Digest.digest(data),
            Self::Blake3 => Blake3Digest.digest(data),
        }
    }

    fn streaming(&self) -> Box<dyn StreamingDigest> {
        match self {
            Self::Sha256 => Sha256Digest.streaming(),
            Self::Blake3 => Blake3Digest.streaming(),
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Incremental document hasher.
///
/// Tracks how many bytes have been fed so callers can report progress.
pub struct DocumentHasher {
    inner: Box<dyn StreamingDigest>,
    total_len: u64,
}

impl DocumentHasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new<D: DigestAlgorithm + ?Sized>(algorithm: &D) -> Self {
        Self {
            inner: algorithm.streaming(),
            total_len: 0,
        }
    }

    /// Update with more data.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.total_len += data.len() as u64;
    }

    /// Total bytes hashed so far.
    #[must_use]
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Finalize and return the digest.
    #[must_use]
    pub fn finalize(self) -> HashOutput {
        self.inner.finalize()
    }
}

/// Hash everything `reader` yields.
///
/// `on_progress` is called after every chunk with the running byte count.
///
/// # Errors
///
/// Returns any read error other than [`io::ErrorKind::Interrupted`].
pub fn digest_reader<D, R, F>(algorithm: &D, mut reader: R, mut on_progress: F) -> io::Result<HashOutput>
where
    D: DigestAlgorithm + ?Sized,
    R: Read,
    F: FnMut(u64),
{
    let mut hasher = DocumentHasher::new(algorithm);
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        on_progress(hasher.total_len());
    }

    Ok(hasher.finalize())
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn to_hex(digest: &HashOutput) -> String {
    hex::encode(digest)
}

/// Whether `s` looks like a rendered digest: 64 lowercase hex characters.
#[must_use]
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
