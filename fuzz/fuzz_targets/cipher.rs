//! Fuzz target for the XOR cipher
//!
//! Tests that encrypt/decrypt round-trips and that decrypting arbitrary text
//! fails with an error instead of panicking.

#![no_main]

use arbitrary::Arbitrary;
use keylab_crypto::cipher::SymmetricCipher;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct CipherInput {
    key: Vec<u8>,
    message: String,
    ciphertext: String,
}

fuzz_target!(|input: CipherInput| {
    let cipher = SymmetricCipher::base64();

    // Empty keys are rejected, never panic
    if input.key.is_empty() {
        assert!(cipher.encrypt(&input.message, &input.key).is_err());
        return;
    }

    let encrypted = cipher.encrypt(&input.message, &input.key).unwrap();
    let decrypted = cipher.decrypt(encrypted.as_str(), &input.key).unwrap();
    assert_eq!(decrypted, input.message);

    let _ = cipher.decrypt(&input.ciphertext, &input.key);
});
