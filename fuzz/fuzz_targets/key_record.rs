//! Fuzz target for key file loading
//!
//! Arbitrary key file contents must load as a valid record or be reported
//! as corrupt. Loading never panics.

#![no_main]

use keylab_crypto::CryptoError;
use keylab_crypto::keystore::KeyStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::TempDir::new() else {
        return;
    };
    let path = dir.path().join("keys.json");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    let store = KeyStore::new(&path);
    match store.load() {
        Ok(Some(record)) => assert!(record.validate().is_ok()),
        Ok(None) => unreachable!("key file was just written"),
        Err(CryptoError::CorruptKeyFile { .. }) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
});
