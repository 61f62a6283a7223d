//! Performance benchmarks for keylab-crypto.
//!
//! Run with: `cargo bench -p keylab-crypto`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use keylab_crypto::cipher::SymmetricCipher;
use keylab_crypto::digest::{Blake3Digest, DigestAlgorithm, Sha256Digest, digest_reader};
use keylab_crypto::keys::{derive_signing_keys, derive_symmetric_key};
use keylab_crypto::signatures::SignatureEngine;

const SIZES: [usize; 5] = [64, 1024, 16384, 65536, 1024 * 1024];

// ============================================================================
// Digest Benchmarks
// ============================================================================

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");

    for size in SIZES {
        let data = vec![0xAA; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("sha256", size), &data, |b, data| {
            b.iter(|| Sha256Digest.digest(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("blake3", size), &data, |b, data| {
            b.iter(|| Blake3Digest.digest(black_box(data)))
        });
    }

    group.finish();
}

fn bench_digest_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest_reader");
    let data = vec![0x55; 4 * 1024 * 1024];

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("sha256_4mib", |b| {
        b.iter(|| digest_reader(&Sha256Digest, black_box(data.as_slice()), |_| {}))
    });

    group.finish();
}

// ============================================================================
// Key Derivation Benchmarks
// ============================================================================

fn bench_key_derivation(c: &mut Criterion) {
    c.bench_function("derive_signing_keys", |b| {
        b.iter(|| derive_signing_keys(black_box("Ivan"), black_box("15031995"), black_box("x")))
    });

    c.bench_function("derive_symmetric_key", |b| {
        b.iter(|| derive_symmetric_key(black_box("a@b.com"), black_box("01011990")))
    });
}

// ============================================================================
// Signature Benchmarks
// ============================================================================

fn bench_sign_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");
    let engine = SignatureEngine::sha256();

    for size in SIZES {
        let document = vec![0x42; size];
        let signature = engine.sign(&document, 299_910);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("sign", size), &document, |b, doc| {
            b.iter(|| engine.sign(black_box(doc), 299_910))
        });
        group.bench_with_input(BenchmarkId::new("verify", size), &document, |b, doc| {
            b.iter(|| engine.verify(black_box(doc), black_box(&signature), 299_910))
        });
    }

    group.finish();
}

// ============================================================================
// Cipher Benchmarks
// ============================================================================

fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher");
    let cipher = SymmetricCipher::base64();
    let key = [0x42u8; 32];

    for size in SIZES {
        let message = "x".repeat(size);
        let ciphertext = cipher.encrypt(&message, &key).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encrypt", size), &message, |b, msg| {
            b.iter(|| cipher.encrypt(black_box(msg), &key))
        });
        group.bench_with_input(BenchmarkId::new("decrypt", size), &ciphertext, |b, ct| {
            b.iter(|| cipher.decrypt(black_box(ct.as_str()), &key))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_digest,
    bench_digest_reader,
    bench_key_derivation,
    bench_sign_verify,
    bench_cipher,
);
criterion_main!(benches);
