//! Metablock serializer: the write-side mirror of
//! `decoder::metablock`/`decoder::command_loop`. Every field is written in
//! exactly the order the decoder reads it; see those two modules for the
//! wire format this produces.
//!
//! Two simplifications relative to the decoder's full generality, both
//! noted in `DESIGN.md`:
//! - literal context modes are transmitted but the context map always
//!   routes every context of a block type to that type's own cluster, so
//!   the encoder never has to compute per-byte context during writing;
//! - commands never reuse the last coded distance and distances never
//!   resolve to a short cache code, so no distance cache needs tracking
//!   while writing (the decoder's cache is still populated, just never
//!   consulted for a stream this encoder produced).

use crate::bitio::BitWriter;
use crate::config::{EncoderOptions, Mode};
use crate::encoder::block_split::{self, Histogram};
use crate::encoder::command::Command;
use crate::huffman::build::{assign_canonical_codes, build_code_lengths};
use crate::huffman::code_length;
use crate::tables::context::ContextMode;
use crate::tables::distance::{DistanceParams, BLOCK_LENGTH_PREFIX};

const LITERAL_ALPHABET_SIZE: usize = 256;
const COMMAND_ALPHABET_SIZE: usize = 704;
const DISTANCE_ALPHABET_SIZE: usize = 544;
const LITERAL_CHUNK: usize = 512;
const COMMAND_CHUNK: usize = 64;

fn ensure_nonempty(freqs: &mut [u32]) {
    if freqs.iter().all(|&f| f == 0) {
        freqs[0] = 1;
    }
}

fn write_varlen(writer: &mut BitWriter, value: u32) {
    if value == 0 {
        writer.write_bits(0, 3);
        return;
    }
    let bits_needed = 32 - value.leading_zeros();
    let nibble_count = ((bits_needed + 3) / 4).clamp(1, 7);
    writer.write_bits(nibble_count as u64, 3);
    for i in 0..nibble_count {
        let nibble = (value >> (4 * i)) & 0xF;
        writer.write_bits(nibble as u64, 4);
    }
}

pub fn write_stream_header(writer: &mut BitWriter, window: crate::config::WindowSize) {
    writer.write_bits(window.is_large() as u64, 1);
    writer.write_bits((window.lgwin() - 10) as u64, 5);
}

pub fn write_last_empty(writer: &mut BitWriter) {
    writer.write_bits(1, 1);
    writer.write_bits(1, 1);
}

fn write_prologue(writer: &mut BitWriter, is_last: bool, mlen: u32, is_uncompressed: bool) {
    writer.write_bits(is_last as u64, 1);
    if is_last {
        writer.write_bits(0, 1);
    }
    write_varlen(writer, mlen);
    writer.write_bits(is_uncompressed as u64, 1);
}

fn write_block_length(writer: &mut BitWriter, length_codes: &[(u32, u8)], len: u32) {
    let code_idx = crate::tables::distance::block_length_code(len);
    let (extra, base) = BLOCK_LENGTH_PREFIX[code_idx];
    let (code, bits) = length_codes[code_idx];
    writer.write_bits(code as u64, bits as u32);
    writer.write_bits((len - base) as u64, extra);
}

fn transition_symbol(prev_type: u32, cur_type: u32, new_type: u32, num_types: u32) -> u32 {
    if new_type == prev_type {
        0
    } else if new_type == (cur_type + 1) % num_types {
        1
    } else {
        new_type + 2
    }
}

/// Write-side counterpart of `decoder::metablock::BlockTracker`: knows the
/// full (type, length) run sequence up front and emits only the
/// transitions the decoder's `advance` would actually consume.
struct BlockTypeCoder {
    num_types: u32,
    types: Vec<u32>,
    lengths: Vec<u32>,
    run_idx: usize,
    prev_type: u32,
    cur_type: u32,
    remaining: u32,
    type_codes: Vec<(u32, u8)>,
    length_codes: Vec<(u32, u8)>,
}

impl BlockTypeCoder {
    fn write_header(writer: &mut BitWriter, types: Vec<u32>, lengths: Vec<u32>, num_types: u32) -> Self {
        write_varlen(writer, num_types - 1);

        let mut type_codes = Vec::new();
        let mut length_codes = Vec::new();

        if num_types > 1 {
            let mut prev = 1u32;
            let mut cur = types[0];
            let mut symbols = Vec::with_capacity(types.len() - 1);
            for &t in &types[1..] {
                symbols.push(transition_symbol(prev, cur, t, num_types));
                prev = cur;
                cur = t;
            }

            let type_alphabet = num_types as usize + 2;
            let mut type_freqs = vec![0u32; type_alphabet];
            for &s in &symbols {
                type_freqs[s as usize] += 1;
            }
            ensure_nonempty(&mut type_freqs);
            let type_depths = build_code_lengths(&type_freqs, 15);
            type_codes = assign_canonical_codes(&type_depths);
            code_length::write(writer, &type_depths);

            let mut length_freqs = vec![0u32; BLOCK_LENGTH_PREFIX.len()];
            for &l in &lengths {
                length_freqs[crate::tables::distance::block_length_code(l)] += 1;
            }
            ensure_nonempty(&mut length_freqs);
            let length_depths = build_code_lengths(&length_freqs, 15);
            length_codes = assign_canonical_codes(&length_depths);
            code_length::write(writer, &length_depths);

            write_block_length(writer, &length_codes, lengths[0]);
        }

        let remaining = lengths[0];
        let cur_type = types[0];
        BlockTypeCoder {
            num_types,
            types,
            lengths,
            run_idx: 0,
            prev_type: 1,
            cur_type,
            remaining,
            type_codes,
            length_codes,
        }
    }

    fn current_type(&self) -> u32 {
        self.cur_type
    }

    fn advance(&mut self, writer: &mut BitWriter) {
        if self.num_types == 1 {
            return;
        }
        if self.remaining == 0 {
            self.run_idx += 1;
            let new_type = self.types[self.run_idx];
            let sym = transition_symbol(self.prev_type, self.cur_type, new_type, self.num_types);
            let (code, bits) = self.type_codes[sym as usize];
            writer.write_bits(code as u64, bits as u32);
            let next_len = self.lengths[self.run_idx];
            write_block_length(writer, &self.length_codes, next_len);
            self.prev_type = self.cur_type;
            self.cur_type = new_type;
            self.remaining = next_len;
        }
        self.remaining = self.remaining.saturating_sub(1);
    }
}

fn build_cluster_codes(histograms: &[Histogram], alphabet_size: usize, writer: &mut BitWriter) -> Vec<Vec<(u32, u8)>> {
    let mut out = Vec::with_capacity(histograms.len());
    for h in histograms {
        let mut freqs = h.counts.clone();
        freqs.resize(alphabet_size, 0);
        ensure_nonempty(&mut freqs);
        let depths = build_code_lengths(&freqs, 15);
        let codes = assign_canonical_codes(&depths);
        code_length::write(writer, &depths);
        out.push(codes);
    }
    out
}

/// Writes a metablock whose payload is stored verbatim (quality 0): the
/// prologue's `is_uncompressed` bit set, then the raw bytes byte-aligned.
pub fn write_uncompressed(writer: &mut BitWriter, chunk: &[u8], is_last: bool) {
    write_prologue(writer, is_last, chunk.len() as u32, true);
    writer.align_to_byte();
    writer.write_raw_bytes(chunk);
}

/// Writes one compressed metablock (prologue + header + command loop body).
/// `literals` must have exactly `commands.iter().map(|c| c.insert_len).sum()`
/// bytes, in emission order. Returns the metablock's decompressed length.
pub fn write_compressed(
    writer: &mut BitWriter,
    commands: &[Command],
    literals: &[u8],
    is_last: bool,
    options: &EncoderOptions,
) -> u32 {
    let total_copy: u32 = commands.iter().map(|c| c.copy_len).sum();
    let mlen = literals.len() as u32 + total_copy;
    write_prologue(writer, is_last, mlen, false);

    let trivial = mlen < 128 || options.quality.get() < 5 || commands.len() < 6;
    let max_types = if trivial { 1 } else { 4 };

    let literal_split = block_split::split(literals.len(), LITERAL_CHUNK, LITERAL_ALPHABET_SIZE, max_types, |i| {
        literals[i] as u32
    });
    let cmd_prefixes: Vec<u32> = commands.iter().map(|c| c.cmd_prefix() as u32).collect();
    let command_split = block_split::split(cmd_prefixes.len(), COMMAND_CHUNK, COMMAND_ALPHABET_SIZE, max_types, |i| {
        cmd_prefixes[i]
    });

    let num_literal_types = literal_split.histograms.len() as u32;
    let num_insert_copy_types = command_split.histograms.len() as u32;
    log::debug!(
        "metablock: mlen={mlen}, {} commands, {num_literal_types} literal cluster(s), \
         {num_insert_copy_types} insert-copy cluster(s), trivial={trivial}",
        commands.len()
    );

    let mut literal_coder = BlockTypeCoder::write_header(writer, literal_split.types, literal_split.lengths, num_literal_types);
    let mut insert_copy_coder =
        BlockTypeCoder::write_header(writer, command_split.types, command_split.lengths, num_insert_copy_types);
    let distance_coder_types = vec![0u32];
    let distance_coder_lengths = vec![u32::MAX];
    let mut distance_coder = BlockTypeCoder::write_header(writer, distance_coder_types, distance_coder_lengths, 1);

    // Context mode choice doesn't affect correctness here: the context map
    // below collapses every context within a type to that type's own
    // cluster, so whatever mode the decoder evaluates lands on the same
    // tree regardless.
    let literal_mode = if options.mode == Mode::Text { ContextMode::Utf8 } else { ContextMode::Signed };
    for _ in 0..num_literal_types {
        writer.write_bits(literal_mode.to_bits() as u64, 2);
    }

    write_varlen(writer, num_literal_types - 1);
    let literal_context_map: Vec<u32> = (0..num_literal_types).flat_map(|t| std::iter::repeat(t).take(64)).collect();
    crate::contextmap::encode(writer, &literal_context_map, num_literal_types as usize);

    let (npostfix, ndirect) = options.mode.distance_params(options.quality);
    writer.write_bits(npostfix as u64, 2);
    write_varlen(writer, ndirect);
    let distance_params = DistanceParams::new(npostfix, ndirect);

    let num_distance_clusters = 4u32;
    write_varlen(writer, num_distance_clusters - 1);
    let distance_context_map: Vec<u32> = (0..4).collect();
    crate::contextmap::encode(writer, &distance_context_map, num_distance_clusters as usize);

    let literal_trees = build_cluster_codes(&literal_split.histograms, LITERAL_ALPHABET_SIZE, writer);
    let insert_copy_trees = build_cluster_codes(&command_split.histograms, COMMAND_ALPHABET_SIZE, writer);

    let mut distance_histograms = vec![Histogram::new(DISTANCE_ALPHABET_SIZE); 4];
    for c in commands {
        if c.reuses_last_distance || c.copy_len == 0 {
            continue;
        }
        let (code, _, _) = distance_params.code_for_distance(c.distance);
        distance_histograms[c.distance_context() as usize].add(code);
    }
    let distance_trees = build_cluster_codes(&distance_histograms, DISTANCE_ALPHABET_SIZE, writer);

    let mut literal_pos = 0usize;
    for command in commands.iter() {
        insert_copy_coder.advance(writer);
        let ic_type = insert_copy_coder.current_type();
        let cmd_prefix = command.cmd_prefix();
        let (code, bits) = insert_copy_trees[ic_type as usize][cmd_prefix as usize];
        writer.write_bits(code as u64, bits as u32);
        let (insert_extra_bits, insert_extra_value) = command.insert_extra();
        if insert_extra_bits > 0 {
            writer.write_bits(insert_extra_value as u64, insert_extra_bits);
        }

        for _ in 0..command.insert_len {
            literal_coder.advance(writer);
            let lit_type = literal_coder.current_type();
            let byte = literals[literal_pos];
            literal_pos += 1;
            let (code, bits) = literal_trees[lit_type as usize][byte as usize];
            writer.write_bits(code as u64, bits as u32);
        }

        // The last command's literals can exactly fill out the metablock's
        // remaining length; when they do, no copy length or distance is
        // written at all (mirrors the decoder's implicit `total_written >=
        // target` check).
        if command.copy_len == 0 {
            break;
        }

        let (copy_extra_bits, copy_extra_value) = command.copy_extra();
        if copy_extra_bits > 0 {
            writer.write_bits(copy_extra_value as u64, copy_extra_bits);
        }

        if !command.reuses_last_distance {
            distance_coder.advance(writer);
            let map_index = command.distance_context() as usize;
            let cluster = distance_context_map[map_index];
            let (d_code, extra_bits, extra_value) = distance_params.code_for_distance(command.distance);
            let (code, bits) = distance_trees[cluster as usize][d_code as usize];
            writer.write_bits(code as u64, bits as u32);
            if extra_bits > 0 {
                writer.write_bits(extra_value as u64, extra_bits);
            }
        }
    }

    mlen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::BitReader;
    use crate::config::WindowSize;
    use crate::decoder::{command_loop, metablock as dm};
    use crate::dictionary::CompoundDictionary;
    use crate::ringbuffer::RingBuffer;

    fn decode_one_metablock(bytes: &[u8], window: WindowSize) -> Vec<u8> {
        let mut reader = BitReader::new(bytes);
        let (_is_last, kind) = dm::read_prologue(&mut reader).unwrap();
        let mlen = match kind {
            dm::MetablockPrologue::Compressed { mlen } => mlen,
            _ => panic!("expected a compressed metablock"),
        };
        let mut header = dm::read_compressed_header(&mut reader, mlen).unwrap();
        let mut ring = RingBuffer::new(window.ring_buffer_size());
        let compound = CompoundDictionary::empty();
        let mut dist_cache = command_loop::DistanceCache::default();
        let mut ctx = command_loop::CommandLoopContext {
            ring: &mut ring,
            compound: &compound,
            window_size: window.window_size() as u64,
            dist_cache: &mut dist_cache,
        };
        command_loop::run(&mut reader, &mut header, &mut ctx).unwrap();
        ring.tail(mlen as usize)
    }

    #[test]
    fn pure_literal_metablock_round_trips() {
        let literals = b"hello metablock".to_vec();
        let commands = vec![Command::insert_only(literals.len() as u32)];
        let options = EncoderOptions::default();
        let mut w = BitWriter::new();
        let mlen = write_compressed(&mut w, &commands, &literals, true, &options);
        assert_eq!(mlen as usize, literals.len());
        let bytes = w.finish();
        let decoded = decode_one_metablock(&bytes, options.window);
        assert_eq!(decoded, literals);
    }

    #[test]
    fn metablock_with_a_copy_round_trips() {
        let literals = b"abcdabcd".to_vec();
        let commands = vec![
            Command { insert_len: 4, copy_len: 4, distance: 4, reuses_last_distance: false },
            Command::insert_only(0),
        ];
        let options = EncoderOptions::default();
        let mut w = BitWriter::new();
        let mlen = write_compressed(&mut w, &commands, &literals, true, &options);
        assert_eq!(mlen, 8);
        let bytes = w.finish();
        let decoded = decode_one_metablock(&bytes, options.window);
        assert_eq!(decoded, b"abcdabcd");
    }
}
