//! # keylab Crypto
//!
//! Deterministic toy cryptography for teaching signing and encryption.
//!
//! This crate provides:
//! - Key derivation from identity attributes (name, birthdate, secret word)
//! - XOR signatures over a document digest, including their forgeability
//! - Repeating-key XOR encryption with base-64 text output
//! - Single-record JSON key files with atomic replacement
//! - Signature and ciphertext files on disk
//!
//! None of this is secure. Keys live in a space of about a million values,
//! signatures are forgeable from one known pair, and the cipher has no
//! integrity protection.
//!
//! ## Algorithm Suite
//!
//! | Function | Construction | Output |
//! |----------|--------------|--------|
//! | Digest | SHA-256 (default) or BLAKE3 | 32 bytes |
//! | Signing key | digest(name ‖ birthdate ‖ secret) mod 1 000 007 | `u64` |
//! | Public key | private × 7 mod 1 000 007 | `u64` |
//! | Signature | digest(document) XOR private key | hex integer |
//! | Cipher key | digest(email ‖ birthdate) | 32 bytes |
//! | Cipher | repeating-key XOR | base-64 text |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod codec;
pub mod digest;
pub mod error;
pub mod files;
pub mod identity;
pub mod keys;
pub mod keystore;
pub mod signatures;

pub use error::{CryptoError, ErrorKind};
