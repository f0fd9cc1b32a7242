//! Criterion benchmarks for the decoder.
//!
//! Run with:
//!   cargo bench --bench decode

use brocodec::{decode, encode, DecoderOptions, EncoderOptions, Quality};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn synthetic_corpus(size: usize) -> Vec<u8> {
    let line = b"the quick brown fox jumps over the lazy dog, 0123456789.\n";
    line.iter().copied().cycle().take(size).collect()
}

fn bench_decode_by_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_by_quality");

    let chunk_size = 262_144usize;
    let data = synthetic_corpus(chunk_size);

    for &quality in &[0u8, 1, 5, 9, 11] {
        let mut options = EncoderOptions::default();
        options.quality = Quality::new(quality).unwrap();
        let compressed = encode(&data, &options).unwrap();

        // Throughput measured in decompressed bytes, the meaningful quantity
        // for a decoder benchmark.
        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", quality),
            &compressed,
            |b, compressed| b.iter(|| decode(compressed, &DecoderOptions::default()).unwrap()),
        );
    }

    group.finish();
}

fn bench_decoded_size_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoded_size");

    let chunk_size = 262_144usize;
    let data = synthetic_corpus(chunk_size);
    let compressed = encode(&data, &EncoderOptions::default()).unwrap();

    group.throughput(Throughput::Bytes(chunk_size as u64));
    group.bench_function("decoded_size", |b| {
        b.iter(|| brocodec::decoded_size(&compressed, &DecoderOptions::default()).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_decode_by_quality, bench_decoded_size_only);
criterion_main!(benches);
