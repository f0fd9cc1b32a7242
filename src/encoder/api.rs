//! Top-level encoder entry points: one-shot `encode` and a streaming
//! `Encoder`.
//!
//! Like the decoder's streaming wrapper, `Encoder::update` just buffers;
//! `finish` runs the whole pipeline in one pass. A true incremental
//! encoder could emit metablocks as each window-sized chunk fills, but
//! since later chunks' block splitting benefits from seeing the whole
//! chunk at once anyway, buffering costs little here and keeps this
//! symmetric with the decoder.

use crate::bitio::BitWriter;
use crate::config::{EncoderOptions, Quality};
use crate::encoder::command::Command;
use crate::encoder::hashers::{chain::HashChainHasher, simple::SimpleHasher, Hasher};
use crate::encoder::{backward_ref, metablock, zopfli};
use crate::error::EncodeError;

fn bucket_bits_for(quality: Quality) -> u32 {
    match quality.get() {
        0..=1 => 10,
        2..=4 => 14,
        5..=9 => 16,
        _ => 17,
    }
}

fn commands_for_chunk(chunk: &[u8], quality: Quality) -> Vec<Command> {
    if quality.get() <= 1 {
        return vec![Command::insert_only(chunk.len() as u32)];
    }
    if quality.uses_zopfli() {
        return zopfli::parse(chunk, bucket_bits_for(quality), quality);
    }
    let bucket_bits = bucket_bits_for(quality);
    if quality.uses_simple_hasher() {
        let mut hasher = SimpleHasher::new(bucket_bits);
        backward_ref::parse(chunk, &mut hasher)
    } else {
        let mut hasher = HashChainHasher::new(bucket_bits, quality.get(), chunk.len());
        backward_ref::parse(chunk, &mut hasher)
    }
}

fn literals_for_commands(chunk: &[u8], commands: &[Command]) -> Vec<u8> {
    let mut literals = Vec::with_capacity(chunk.len());
    let mut pos = 0usize;
    for c in commands {
        literals.extend_from_slice(&chunk[pos..pos + c.insert_len as usize]);
        pos += c.insert_len as usize + c.copy_len as usize;
    }
    literals
}

/// Encodes `data` as a complete brotli-family stream: a stream header
/// followed by one metablock per window-sized chunk. The decoder's ring
/// buffer bounds how much decompressed output a single metablock can
/// reference back into, and that constraint applies symmetrically here, so
/// chunk boundaries fall at the window size rather than at a single
/// unbounded metablock.
pub fn encode(data: &[u8], options: &EncoderOptions) -> Result<Vec<u8>, EncodeError> {
    let mut writer = BitWriter::new();
    metablock::write_stream_header(&mut writer, options.window);

    if data.is_empty() {
        metablock::write_last_empty(&mut writer);
        return Ok(writer.finish());
    }

    let chunk_size = options.window.window_size();
    let chunks: Vec<&[u8]> = data.chunks(chunk_size).collect();
    let last_idx = chunks.len() - 1;

    for (i, &chunk) in chunks.iter().enumerate() {
        let is_last = i == last_idx;
        if options.quality.get() == 0 {
            metablock::write_uncompressed(&mut writer, chunk, is_last);
        } else {
            let commands = commands_for_chunk(chunk, options.quality);
            let literals = literals_for_commands(chunk, &commands);
            metablock::write_compressed(&mut writer, &commands, &literals, is_last, options);
        }
    }

    Ok(writer.finish())
}

/// Buffers input across `update` calls and runs the encoder once on
/// `finish`.
pub struct Encoder {
    buffer: Vec<u8>,
    options: EncoderOptions,
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Encoder { buffer: Vec::new(), options }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn finish(self) -> Result<Vec<u8>, EncodeError> {
        encode(&self.buffer, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderOptions;
    use crate::decoder;

    #[test]
    fn empty_input_round_trips() {
        let options = EncoderOptions::default();
        let bytes = encode(&[], &options).unwrap();
        let decoded = decoder::decode(&bytes, &DecoderOptions::default()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn quality_zero_round_trips_uncompressed() {
        let mut options = EncoderOptions::default();
        options.quality = Quality::new(0).unwrap();
        let data = b"raw bytes, no compression".to_vec();
        let bytes = encode(&data, &options).unwrap();
        let decoded = decoder::decode(&bytes, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn repetitive_text_round_trips_at_default_quality() {
        let options = EncoderOptions::default();
        let data = b"the quick brown fox the quick brown fox the quick brown fox".to_vec();
        let bytes = encode(&data, &options).unwrap();
        let decoded = decoder::decode(&bytes, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn streaming_encoder_matches_one_shot() {
        let options = EncoderOptions::default();
        let mut enc = Encoder::new(options.clone());
        enc.update(b"hello ");
        enc.update(b"world");
        let bytes = enc.finish().unwrap();
        let decoded = decoder::decode(&bytes, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded, b"hello world");
    }
}
