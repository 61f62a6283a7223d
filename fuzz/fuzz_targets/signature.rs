//! Fuzz target for signature parsing and verification
//!
//! Arbitrary signature text must parse or fail cleanly, and verification
//! must never panic whatever its width.

#![no_main]

use arbitrary::Arbitrary;
use keylab_crypto::keys::MODULO;
use keylab_crypto::signatures::{Signature, SignatureEngine};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct SignatureInput {
    document: Vec<u8>,
    signature_text: String,
    private_key: u64,
}

fuzz_target!(|input: SignatureInput| {
    let engine = SignatureEngine::sha256();
    let key = input.private_key % MODULO;

    if let Ok(signature) = Signature::from_hex(&input.signature_text) {
        let _ = engine.verify(&input.document, &signature, key);

        // Canonical text must parse back to the same value
        let reparsed = Signature::from_hex(signature.as_str()).unwrap();
        assert_eq!(reparsed, signature);
    }

    let own = engine.sign(&input.document, key);
    assert!(engine.verify(&input.document, &own, key));
});
