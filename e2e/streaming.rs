//! The streaming `Encoder`/`Decoder` wrappers must produce exactly what the
//! one-shot `encode`/`decode` functions would, regardless of how the input
//! is chopped into `update()` calls.

use brocodec::{decode, encode, Decoder, DecoderOptions, Encoder, EncoderOptions, Quality};

fn encode_in_chunks(data: &[u8], chunk_size: usize, options: &EncoderOptions) -> Vec<u8> {
    let mut encoder = Encoder::new(options.clone());
    for chunk in data.chunks(chunk_size.max(1)) {
        encoder.update(chunk);
    }
    encoder.finish().unwrap()
}

fn decode_in_chunks(data: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut decoder = Decoder::new(DecoderOptions::default());
    for chunk in data.chunks(chunk_size.max(1)) {
        decoder.update(chunk);
    }
    decoder.finish().unwrap()
}

#[test]
fn streaming_encoder_matches_one_shot_across_chunk_sizes() {
    let data = "streaming round trip exercise, repeated for good measure. ".repeat(50);
    let mut options = EncoderOptions::default();
    options.quality = Quality::new(9).unwrap();

    let one_shot = encode(data.as_bytes(), &options).unwrap();
    for chunk_size in [1, 7, 64, 4096] {
        let streamed = encode_in_chunks(data.as_bytes(), chunk_size, &options);
        assert_eq!(streamed, one_shot, "chunk size {chunk_size} diverged from one-shot encode");
    }
}

#[test]
fn streaming_decoder_matches_one_shot_across_chunk_sizes() {
    let data = "streaming decode exercise. ".repeat(80);
    let compressed = encode(data.as_bytes(), &EncoderOptions::default()).unwrap();

    let one_shot = decode(&compressed, &DecoderOptions::default()).unwrap();
    for chunk_size in [1, 3, 17, 4096] {
        let streamed = decode_in_chunks(&compressed, chunk_size);
        assert_eq!(streamed, one_shot, "chunk size {chunk_size} diverged from one-shot decode");
    }
    assert_eq!(one_shot, data.as_bytes());
}

#[test]
fn streaming_round_trip_through_both_wrappers() {
    let data = b"feed the streaming encoder and the streaming decoder alike";
    let mut encoder = Encoder::new(EncoderOptions::default());
    encoder.update(&data[..10]);
    encoder.update(&data[10..]);
    let compressed = encoder.finish().unwrap();

    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.update(&compressed[..compressed.len() / 2]);
    decoder.update(&compressed[compressed.len() / 2..]);
    let decoded = decoder.finish().unwrap();

    assert_eq!(decoded, data);
}

#[test]
fn empty_streaming_session_round_trips_to_empty_output() {
    let encoder = Encoder::new(EncoderOptions::default());
    let compressed = encoder.finish().unwrap();

    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.update(&compressed);
    let decoded = decoder.finish().unwrap();
    assert!(decoded.is_empty());
}
