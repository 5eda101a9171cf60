// Signing & verification benchmarks for the TRINARY protocol.
//
// Covers key derivation and address generation at each security level,
// bundle-hash signing and verification, and finalizing a bundle (which
// includes the insecure-hash retry loop).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trinary_protocol::crypto::{
    derive_key, generate_address, seed_trits, sign, validate_signatures, SecurityLevel,
};
use trinary_protocol::transaction::BundleBuilder;

const SEED: &str =
    "BENCHSEED9BENCHSEED9BENCHSEED9BENCHSEED9BENCHSEED9BENCHSEED9BENCHSEED9BENCHSEED9B";

const BUNDLE_HASH: &str =
    "NKBFSZDQOBI9DYYHTEJ9JNGSPHBXPUSKTGQFQGFCFIIQEJZFXXYGGFMK9UEZOINOGDLJCBALHRGT9WNJR";

const LEVELS: [SecurityLevel; 3] = [
    SecurityLevel::Low,
    SecurityLevel::Medium,
    SecurityLevel::High,
];

fn bench_derive_key(c: &mut Criterion) {
    let seed = seed_trits(SEED).unwrap();
    let mut group = c.benchmark_group("wots/derive_key");

    for level in LEVELS {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| derive_key(&seed, 7, level));
        });
    }

    group.finish();
}

fn bench_generate_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("wots/generate_address");
    group.sample_size(20);

    for level in LEVELS {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| generate_address(SEED, 7, level).unwrap());
        });
    }

    group.finish();
}

fn bench_sign(c: &mut Criterion) {
    c.bench_function("wots/sign_level2", |b| {
        b.iter(|| sign(SEED, 0, SecurityLevel::Medium, BUNDLE_HASH).unwrap());
    });
}

fn bench_verify(c: &mut Criterion) {
    let address = generate_address(SEED, 0, SecurityLevel::Medium).unwrap();
    let fragments = sign(SEED, 0, SecurityLevel::Medium, BUNDLE_HASH).unwrap();

    c.bench_function("wots/verify_level2", |b| {
        b.iter(|| assert!(validate_signatures(&address, &fragments, BUNDLE_HASH).unwrap()));
    });
}

fn bench_finalize_bundle(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundle/finalize");

    for outputs in [1usize, 4, 16] {
        group.throughput(Throughput::Elements(outputs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(outputs), &outputs, |b, &outputs| {
            b.iter(|| {
                let mut builder = BundleBuilder::new();
                for i in 0..outputs {
                    builder
                        .add_entry(1, &"B".repeat(81), i as i64, "BENCH", 1_700_000_000)
                        .unwrap();
                }
                builder.finalize(&[]).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_derive_key,
    bench_generate_address,
    bench_sign,
    bench_verify,
    bench_finalize_bundle,
);
criterion_main!(benches);
