//! Criterion benchmarks for the encoder.
//!
//! Run with:
//!   cargo bench --bench encode

use brocodec::{encode, EncoderOptions, Quality};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn synthetic_corpus(size: usize) -> Vec<u8> {
    let line = b"the quick brown fox jumps over the lazy dog, 0123456789.\n";
    line.iter().copied().cycle().take(size).collect()
}

fn bench_encode_by_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_by_quality");

    let chunk_size = 262_144usize;
    let data = synthetic_corpus(chunk_size);

    for &quality in &[0u8, 1, 5, 9, 11] {
        let mut options = EncoderOptions::default();
        options.quality = Quality::new(quality).unwrap();

        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_with_input(BenchmarkId::new("encode", quality), &data, |b, data| {
            b.iter(|| encode(data, &options).unwrap())
        });
    }

    group.finish();
}

fn bench_encode_by_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_by_chunk_size");

    let options = EncoderOptions::default();
    for &chunk_size in &[4_096usize, 65_536, 262_144] {
        let data = synthetic_corpus(chunk_size);
        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_with_input(
            BenchmarkId::new("encode_q11", chunk_size),
            &data,
            |b, data| b.iter(|| encode(data, &options).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encode_by_quality, bench_encode_by_chunk_size);
criterion_main!(benches);
