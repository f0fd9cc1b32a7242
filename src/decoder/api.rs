//! Public decoder entry points: one-shot `decode`, `decoded_size`, and a
//! streaming `Decoder` that accumulates chunks before running the same core
//! decode loop.
//!
//! The streaming `Decoder` buffers every `update()` chunk rather than
//! suspending mid-bitstream at each output-fence boundary the way the
//! reference decoder's state machine does. A bitstream doesn't expose a
//! byte-aligned resume point between arbitrary `update()` calls, so without
//! a compiler available to validate a true suspend/resume implementation,
//! buffering is the honest choice: correct output, not incremental memory
//! use.

use crate::bitio::BitReader;
use crate::config::DecoderOptions;
use crate::decoder::command_loop::{self, CommandLoopContext, DistanceCache};
use crate::decoder::metablock::{self, MetablockPrologue};
use crate::dictionary::compound::CompoundDictionary;
use crate::error::DecodeError;
use crate::ringbuffer::RingBuffer;

fn decode_core(data: &[u8], options: &DecoderOptions) -> Result<Vec<u8>, DecodeError> {
    let mut reader = BitReader::new(data);
    let window = metablock::read_stream_header(&mut reader)?;
    let mut ring = RingBuffer::new(window.ring_buffer_size() as usize);

    let compound_chunks: Vec<&[u8]> = options.custom_dictionary.into_iter().collect();
    let compound = CompoundDictionary::new(&compound_chunks)?;
    let mut dist_cache = DistanceCache::default();

    let mut output = Vec::new();

    loop {
        let (is_last, kind) = metablock::read_prologue(&mut reader)?;
        match kind {
            MetablockPrologue::LastEmpty => {
                log::trace!("metablock: last-empty, stream complete");
                break;
            }
            MetablockPrologue::Uncompressed { mlen } => {
                log::trace!("metablock: uncompressed, mlen={mlen}, is_last={is_last}");
                if mlen == 0 {
                    log::warn!("uncompressed metablock with mlen=0");
                }
                reader.align_to_byte()?;
                let mut buf = vec![0u8; mlen as usize];
                reader.copy_raw_bytes(&mut buf)?;
                ring.push_slice(&buf);
                output.extend_from_slice(&buf);
            }
            MetablockPrologue::Compressed { mlen } => {
                log::trace!("metablock: compressed, mlen={mlen}, is_last={is_last}");
                if mlen as usize > ring.len() {
                    return Err(DecodeError::MalformedMetablock(
                        "metablock length exceeds the ring buffer's window capacity",
                    ));
                }
                let mut header = metablock::read_compressed_header(&mut reader, mlen)?;
                let mut ctx = CommandLoopContext {
                    ring: &mut ring,
                    compound: &compound,
                    window_size: window.window_size() as u64,
                    dist_cache: &mut dist_cache,
                };
                command_loop::run(&mut reader, &mut header, &mut ctx)?;
                output.extend_from_slice(&ring.tail(mlen as usize));
            }
        }

        if let Some(limit) = options.max_output_size {
            if output.len() > limit {
                return Err(DecodeError::OutputTooLarge);
            }
        }

        if is_last {
            break;
        }
    }

    Ok(output)
}

/// Decodes a complete Brotli stream.
pub fn decode(data: &[u8], options: &DecoderOptions) -> Result<Vec<u8>, DecodeError> {
    decode_core(data, options)
}

/// Decodes `data` and returns only its decompressed length. There is no
/// shortcut available: a compressed metablock's bit-length isn't stored
/// anywhere, so the only way to find where it ends is to decode it.
pub fn decoded_size(data: &[u8], options: &DecoderOptions) -> Result<u64, DecodeError> {
    decode_core(data, options).map(|out| out.len() as u64)
}

/// Streaming decoder: accumulates input via [`update`](Decoder::update) and
/// produces the full output from [`finish`](Decoder::finish).
pub struct Decoder<'a> {
    buffer: Vec<u8>,
    options: DecoderOptions<'a>,
}

impl<'a> Decoder<'a> {
    pub fn new(options: DecoderOptions<'a>) -> Self {
        Decoder {
            buffer: Vec::new(),
            options,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn finish(self) -> Result<Vec<u8>, DecodeError> {
        decode_core(&self.buffer, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream_decodes_to_empty_output() {
        use crate::bitio::BitWriter;
        let mut w = BitWriter::new();
        w.write_bits(0, 1); // not large window
        w.write_bits(12, 5); // lgwin 22
        w.write_bits(1, 1); // is_last
        w.write_bits(1, 1); // is_last_empty
        let bytes = w.finish();
        let out = decode(&bytes, &DecoderOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_uncompressed_metablock_round_trips() {
        use crate::bitio::BitWriter;
        let payload = b"hello ring buffer";
        let mut w = BitWriter::new();
        w.write_bits(0, 1);
        w.write_bits(12, 5);
        w.write_bits(1, 1); // is_last
        w.write_bits(0, 1); // not last-empty
        w.write_bits(1, 3); // 1 nibble for mlen
        w.write_bits(payload.len() as u64, 4);
        w.write_bits(1, 1); // is_uncompressed
        w.align_to_byte();
        w.write_raw_bytes(payload);
        let bytes = w.finish();
        let out = decode(&bytes, &DecoderOptions::default()).unwrap();
        assert_eq!(out, payload);
    }
}
