//! Encode-then-decode round trips across the full quality range and a
//! representative set of input shapes.

use brocodec::{decode, decoded_size, encode, DecoderOptions, EncoderOptions, Quality};

fn options_at(quality: u8) -> EncoderOptions {
    let mut options = EncoderOptions::default();
    options.quality = Quality::new(quality).unwrap();
    options
}

fn assert_round_trips(data: &[u8], quality: u8) {
    let options = options_at(quality);
    let compressed = encode(data, &options).unwrap_or_else(|e| {
        panic!("encode failed at quality {quality} for {} bytes: {e}", data.len())
    });
    let decoded = decode(&compressed, &DecoderOptions::default()).unwrap_or_else(|e| {
        panic!("decode failed at quality {quality} for {} bytes: {e}", data.len())
    });
    assert_eq!(decoded, data, "round trip mismatch at quality {quality}");

    let size = decoded_size(&compressed, &DecoderOptions::default()).unwrap();
    assert_eq!(size, data.len() as u64);
}

#[test]
fn empty_input_round_trips_at_every_quality() {
    for q in 0..=Quality::MAX {
        assert_round_trips(b"", q);
    }
}

#[test]
fn short_literal_only_input_round_trips() {
    for q in 0..=Quality::MAX {
        assert_round_trips(b"hi", q);
    }
}

#[test]
fn highly_repetitive_text_round_trips() {
    let data = "the quick brown fox jumps over the lazy dog. ".repeat(200);
    for q in [0, 1, 2, 4, 5, 9, 10, 11] {
        assert_round_trips(data.as_bytes(), q);
    }
}

#[test]
fn full_byte_range_round_trips() {
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    for q in [0, 5, 11] {
        assert_round_trips(&data, q);
    }
}

#[test]
fn run_length_data_round_trips() {
    let mut data = Vec::new();
    for b in 0..8u8 {
        data.extend(std::iter::repeat(b).take(300));
    }
    for q in [2, 5, 9, 10, 11] {
        assert_round_trips(&data, q);
    }
}

#[test]
fn input_larger_than_one_window_chunks_correctly() {
    // lgwin 10 => window_size 1024; exercise the encoder's chunk-per-window
    // loop with input spanning several chunks.
    let mut options = EncoderOptions::default();
    options.quality = Quality::new(9).unwrap();
    options.window = brocodec::WindowSize::new(10).unwrap();

    let data = "brotli-family codec chunk boundary test. ".repeat(500);
    let compressed = encode(data.as_bytes(), &options).unwrap();
    let decoded = decode(&compressed, &DecoderOptions::default()).unwrap();
    assert_eq!(decoded, data.as_bytes());
}
