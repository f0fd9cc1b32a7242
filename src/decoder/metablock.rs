//! Metablock header parsing: stream header, the ISLAST/MLEN prologue, block
//! type/length trackers, context modes/maps, and the per-cluster Huffman
//! trees a compressed metablock's body decodes against.

use crate::bitio::BitReader;
use crate::config::WindowSize;
use crate::contextmap;
use crate::error::DecodeError;
use crate::huffman::{code_length, decode_table};
use crate::tables::context::ContextMode;
use crate::tables::distance::BLOCK_LENGTH_PREFIX;

pub const LITERAL_ALPHABET_SIZE: usize = 256;
/// Matches the command cost table's range named in the encoder's Zopfli
/// cost model (`costCmd[0..703]`): 11 length-code offsets times 64.
pub const COMMAND_ALPHABET_SIZE: usize = 704;
/// Matches the encoder's Zopfli distance cost table range
/// (`costDist[0..543]`): a fixed upper bound covering every NPOSTFIX/NDIRECT
/// combination this codec supports.
pub const DISTANCE_ALPHABET_SIZE: usize = 544;

/// Reads `nibble_count` (3 bits, 0..=7) then that many 4-bit nibbles,
/// little-nibble first. A compact variable-length integer used for MLEN,
/// block-type counts, and cluster counts.
pub fn read_varlen(reader: &mut BitReader) -> Result<u32, DecodeError> {
    let nibble_count = reader.read_bits(3)?;
    let mut value = 0u32;
    for i in 0..nibble_count {
        let nibble = reader.read_bits(4)?;
        value |= nibble << (4 * i);
    }
    Ok(value)
}

pub fn read_stream_header(reader: &mut BitReader) -> Result<WindowSize, DecodeError> {
    let is_large = reader.read_bits(1)? != 0;
    let lgwin = reader.read_bits(5)? + 10;
    if is_large {
        WindowSize::new_large(lgwin as u8)
            .map_err(|_| DecodeError::MalformedHeader("lgwin out of range for large window"))
    } else {
        WindowSize::new(lgwin as u8).map_err(|_| DecodeError::MalformedHeader("lgwin out of range"))
    }
}

pub enum MetablockPrologue {
    LastEmpty,
    Uncompressed { mlen: u32 },
    Compressed { mlen: u32 },
}

pub fn read_prologue(
    reader: &mut BitReader,
) -> Result<(bool, MetablockPrologue), DecodeError> {
    let is_last = reader.read_bits(1)? != 0;
    if is_last {
        let is_last_empty = reader.read_bits(1)? != 0;
        if is_last_empty {
            return Ok((true, MetablockPrologue::LastEmpty));
        }
    }
    let mlen = read_varlen(reader)?;
    let is_uncompressed = reader.read_bits(1)? != 0;
    let kind = if is_uncompressed {
        MetablockPrologue::Uncompressed { mlen }
    } else {
        MetablockPrologue::Compressed { mlen }
    };
    Ok((is_last, kind))
}

/// Tracks one of the three block-type streams (literal, insert-and-copy,
/// distance): which type is currently active, and how many more symbols
/// belong to the current block before the next type switch.
pub struct BlockTracker {
    pub num_types: u32,
    type_table: Option<Vec<u32>>,
    length_table: Vec<u32>,
    prev_type: u32,
    cur_type: u32,
    pub remaining: u32,
}

impl BlockTracker {
    pub fn read(reader: &mut BitReader) -> Result<Self, DecodeError> {
        let num_types = read_varlen(reader)? + 1;
        if num_types == 1 {
            return Ok(BlockTracker {
                num_types,
                type_table: None,
                length_table: Vec::new(),
                prev_type: 0,
                cur_type: 0,
                remaining: u32::MAX,
            });
        }
        let type_alphabet = num_types as usize + 2;
        let type_lengths = code_length::read(reader, type_alphabet)?;
        let type_table = decode_table::build(&type_lengths, decode_table::ROOT_BITS_MAIN)?;

        let length_lengths = code_length::read(reader, BLOCK_LENGTH_PREFIX.len())?;
        let length_table = decode_table::build(&length_lengths, decode_table::ROOT_BITS_MAIN)?;

        let first_len = read_block_length(reader, &length_table)?;
        Ok(BlockTracker {
            num_types,
            type_table: Some(type_table),
            length_table,
            prev_type: 1,
            cur_type: 0,
            remaining: first_len,
        })
    }

    pub fn current_type(&self) -> u32 {
        self.cur_type
    }

    /// Consumes one symbol from the current block, switching block types
    /// (and reading the next block's length) if the block just ended.
    pub fn advance(&mut self, reader: &mut BitReader) -> Result<(), DecodeError> {
        if self.type_table.is_none() {
            return Ok(());
        }
        if self.remaining == 0 {
            let table = self
                .type_table
                .as_ref()
                .expect("multi-type tracker always has a type table");
            let symbol = decode_symbol(reader, table)?;
            let new_type = match symbol {
                0 => self.prev_type,
                1 => (self.cur_type + 1) % self.num_types,
                s => s - 2,
            };
            if new_type >= self.num_types {
                return Err(DecodeError::MalformedMetablock(
                    "block type symbol names a type that doesn't exist",
                ));
            }
            self.prev_type = self.cur_type;
            self.cur_type = new_type;
            self.remaining = read_block_length(reader, &self.length_table)?;
        }
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }
}

fn read_block_length(reader: &mut BitReader, table: &[u32]) -> Result<u32, DecodeError> {
    let code = decode_symbol(reader, table)? as usize;
    let (extra, base) = BLOCK_LENGTH_PREFIX
        .get(code)
        .ok_or(DecodeError::MalformedMetablock("block length code out of range"))?;
    let extra_value = reader.read_bits(*extra)?;
    Ok(base + extra_value)
}

pub fn decode_symbol(reader: &mut BitReader, table: &[u32]) -> Result<u32, DecodeError> {
    use decode_table::{entry_bits, entry_symbol, ROOT_BITS_MAIN};
    let peek = reader.peek_bits(ROOT_BITS_MAIN)?;
    let entry = table[peek as usize];
    let bits = entry_bits(entry);
    if bits <= ROOT_BITS_MAIN {
        reader.skip_bits(bits)?;
        return Ok(entry_symbol(entry));
    }
    reader.skip_bits(ROOT_BITS_MAIN)?;
    let sub_bits = bits - ROOT_BITS_MAIN;
    let sub_peek = reader.peek_bits(sub_bits)?;
    let sub_entry = table[entry_symbol(entry) as usize + sub_peek as usize];
    reader.skip_bits(entry_bits(sub_entry))?;
    Ok(entry_symbol(sub_entry))
}

pub struct MetablockHeader {
    pub mlen: u32,
    pub literal_tracker: BlockTracker,
    pub insert_copy_tracker: BlockTracker,
    pub distance_tracker: BlockTracker,
    pub literal_context_modes: Vec<ContextMode>,
    pub literal_context_map: Vec<u32>,
    pub distance_context_map: Vec<u32>,
    pub literal_trees: Vec<Vec<u32>>,
    pub insert_copy_trees: Vec<Vec<u32>>,
    pub distance_trees: Vec<Vec<u32>>,
    pub npostfix: u32,
    pub ndirect: u32,
}

pub fn read_compressed_header(
    reader: &mut BitReader,
    mlen: u32,
) -> Result<MetablockHeader, DecodeError> {
    let literal_tracker = BlockTracker::read(reader)?;
    let insert_copy_tracker = BlockTracker::read(reader)?;
    let distance_tracker = BlockTracker::read(reader)?;

    let mut literal_context_modes = Vec::with_capacity(literal_tracker.num_types as usize);
    for _ in 0..literal_tracker.num_types {
        literal_context_modes.push(ContextMode::from_bits(reader.read_bits(2)?));
    }

    let num_literal_clusters = read_varlen(reader)? + 1;
    let literal_context_map = contextmap::decode(
        reader,
        literal_tracker.num_types as usize * 64,
        num_literal_clusters as usize,
    )?;

    let npostfix = reader.read_bits(2)?;
    let ndirect = read_varlen(reader)?;

    let num_distance_clusters = read_varlen(reader)? + 1;
    let distance_context_map = contextmap::decode(
        reader,
        distance_tracker.num_types as usize * 4,
        num_distance_clusters as usize,
    )?;

    let mut literal_trees = Vec::with_capacity(num_literal_clusters as usize);
    for _ in 0..num_literal_clusters {
        let lengths = code_length::read(reader, LITERAL_ALPHABET_SIZE)?;
        literal_trees.push(decode_table::build(&lengths, decode_table::ROOT_BITS_MAIN)?);
    }

    let mut insert_copy_trees = Vec::with_capacity(insert_copy_tracker.num_types as usize);
    for _ in 0..insert_copy_tracker.num_types {
        let lengths = code_length::read(reader, COMMAND_ALPHABET_SIZE)?;
        insert_copy_trees.push(decode_table::build(&lengths, decode_table::ROOT_BITS_MAIN)?);
    }

    let mut distance_trees = Vec::with_capacity(num_distance_clusters as usize);
    for _ in 0..num_distance_clusters {
        let lengths = code_length::read(reader, DISTANCE_ALPHABET_SIZE)?;
        distance_trees.push(decode_table::build(&lengths, decode_table::ROOT_BITS_MAIN)?);
    }

    Ok(MetablockHeader {
        mlen,
        literal_tracker,
        insert_copy_tracker,
        distance_tracker,
        literal_context_modes,
        literal_context_map,
        distance_context_map,
        literal_trees,
        insert_copy_trees,
        distance_trees,
        npostfix,
        ndirect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::BitWriter;

    #[test]
    fn stream_header_round_trips_standard_window() {
        let mut w = BitWriter::new();
        w.write_bits(0, 1);
        w.write_bits(12, 5); // lgwin = 22
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let window = read_stream_header(&mut r).unwrap();
        assert_eq!(window.lgwin(), 22);
        assert!(!window.is_large());
    }

    #[test]
    fn varlen_round_trips_zero_and_small_values() {
        let mut w = BitWriter::new();
        w.write_bits(0, 3);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert_eq!(read_varlen(&mut r).unwrap(), 0);
    }

    #[test]
    fn last_empty_metablock_prologue() {
        let mut w = BitWriter::new();
        w.write_bits(1, 1);
        w.write_bits(1, 1);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let (is_last, kind) = read_prologue(&mut r).unwrap();
        assert!(is_last);
        assert!(matches!(kind, MetablockPrologue::LastEmpty));
    }
}
