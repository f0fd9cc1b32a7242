//! Huffman table builder: canonical code lengths -> a flat lookup array
//! usable by the decoder's fused command loop.
//!
//! Table format: each `u32` entry packs `(bits << 16) | symbol`. A
//! root-table entry with `bits <= root_bits` is a direct hit; one with
//! `bits > root_bits` is a pointer: the low 16 bits are the subtable's start
//! index within the same flat array, and `bits - root_bits` is how many
//! more bits to peek to index into it.

use crate::error::DecodeError;
use std::collections::HashMap;

pub const ROOT_BITS_MAIN: u32 = 8;
pub const ROOT_BITS_CODE_LENGTH: u32 = 5;

#[inline]
fn pack(bits: u32, symbol: u32) -> u32 {
    (bits << 16) | symbol
}

#[inline]
pub fn entry_bits(entry: u32) -> u32 {
    entry >> 16
}

#[inline]
pub fn entry_symbol(entry: u32) -> u32 {
    entry & 0xffff
}

fn reverse_bits(code: u32, len: u32) -> u32 {
    let mut c = code;
    let mut r = 0u32;
    for _ in 0..len {
        r = (r << 1) | (c & 1);
        c >>= 1;
    }
    r
}

/// Builds a two-level Huffman decode table from `code_lengths` (one entry
/// per symbol, `0` for unused symbols, `<=15` otherwise). Returns the flat
/// table, or an error on over-subscribed codes.
pub fn build(code_lengths: &[u8], root_bits: u32) -> Result<Vec<u32>, DecodeError> {
    let mut count = [0u32; 16];
    for &l in code_lengths {
        if l > 15 {
            return Err(DecodeError::MalformedHuffman("code length exceeds 15 bits"));
        }
        count[l as usize] += 1;
    }
    let total_used: u32 = count[1..].iter().sum();
    let root_size = 1usize << root_bits;

    if total_used == 0 {
        return Err(DecodeError::MalformedHuffman("huffman tree has no symbols"));
    }

    if total_used == 1 {
        // Single-symbol tree: whole table filled with that symbol at depth
        // 0 — the decoder consumes zero bits for it.
        let symbol = code_lengths
            .iter()
            .position(|&l| l != 0)
            .expect("total_used == 1 implies one non-zero length") as u32;
        return Ok(vec![pack(0, symbol); root_size]);
    }

    // Kraft-equality check: the code must exactly fill the code space,
    // neither over- nor under-subscribed.
    let mut space: i64 = 1i64 << 15;
    for len in 1..16 {
        space -= (count[len] as i64) << (15 - len);
    }
    if space != 0 {
        return Err(DecodeError::MalformedHuffman(
            "huffman code space is over- or under-subscribed",
        ));
    }

    // Stable sort of symbols by code length.
    let mut offset = [0u32; 17];
    for len in 1..16 {
        offset[len + 1] = offset[len] + count[len];
    }
    let mut sorted = vec![0u32; total_used as usize];
    {
        let mut cursor = offset;
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len != 0 {
                let len = len as usize;
                sorted[cursor[len] as usize] = symbol as u32;
                cursor[len] += 1;
            }
        }
    }

    // Canonical code assignment (ascending length, ascending symbol order
    // within a length).
    let mut canonical_code = vec![0u32; code_lengths.len()];
    let mut code = 0u32;
    let mut idx = 0usize;
    for len in 1..16 {
        let n = count[len] as usize;
        for _ in 0..n {
            let symbol = sorted[idx] as usize;
            canonical_code[symbol] = code;
            code += 1;
            idx += 1;
        }
        code <<= 1;
    }

    let mut table = vec![0u32; root_size];

    // Direct root entries for codes with length <= root_bits.
    for (symbol, &len) in code_lengths.iter().enumerate() {
        if len == 0 || len as u32 > root_bits {
            continue;
        }
        let len = len as u32;
        let rev = reverse_bits(canonical_code[symbol], len);
        let stride = 1usize << len;
        let mut i = rev as usize;
        while i < root_size {
            table[i] = pack(len, symbol as u32);
            i += stride;
        }
    }

    // Group codes with length > root_bits by their low `root_bits` bits.
    let mut groups: HashMap<u32, Vec<(u32, u32, u32)>> = HashMap::new();
    for (symbol, &len) in code_lengths.iter().enumerate() {
        if (len as u32) <= root_bits || len == 0 {
            continue;
        }
        let len = len as u32;
        let rev = reverse_bits(canonical_code[symbol], len);
        let prefix = rev & (root_size as u32 - 1);
        let remainder = rev >> root_bits;
        groups
            .entry(prefix)
            .or_default()
            .push((symbol as u32, len - root_bits, remainder));
    }

    for (prefix, symbols) in groups {
        let sub_bits = symbols.iter().map(|&(_, l, _)| l).max().unwrap();
        let sub_size = 1usize << sub_bits;
        let subtable_start = table.len();
        table.resize(subtable_start + sub_size, 0);
        for (symbol, remaining_len, remainder) in symbols {
            let stride = 1usize << remaining_len;
            let mut i = remainder as usize;
            while i < sub_size {
                table[subtable_start + i] = pack(remaining_len, symbol);
                i += stride;
            }
        }
        table[prefix as usize] = pack(root_bits + sub_bits, subtable_start as u32);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::{BitReader, BitWriter};

    fn decode_one(table: &[u32], root_bits: u32, reader: &mut BitReader) -> u32 {
        let peek = reader.peek_bits(root_bits).unwrap();
        let entry = table[peek as usize];
        let bits = entry_bits(entry);
        if bits <= root_bits {
            reader.skip_bits(bits).unwrap();
            return entry_symbol(entry);
        }
        reader.skip_bits(root_bits).unwrap();
        let sub_bits = bits - root_bits;
        let sub_peek = reader.peek_bits(sub_bits).unwrap();
        let sub_entry = table[entry_symbol(entry) as usize + sub_peek as usize];
        reader.skip_bits(entry_bits(sub_entry)).unwrap();
        entry_symbol(sub_entry)
    }

    #[test]
    fn single_symbol_tree_consumes_zero_bits() {
        let lengths = [0u8, 3]; // symbol 1 only
        let table = build(&lengths, ROOT_BITS_CODE_LENGTH).unwrap();
        let data = [0u8; 1];
        let mut r = BitReader::new(&data);
        assert_eq!(decode_one(&table, ROOT_BITS_CODE_LENGTH, &mut r), 1);
        // Zero bits consumed.
        assert_eq!(r.bits_remaining(), 8);
    }

    #[test]
    fn rejects_oversubscribed_code() {
        // Two symbols both claiming length 1 is fine (2^-1+2^-1=1), but three
        // symbols at length 1 overflows the code space.
        let lengths = [1u8, 1, 1];
        assert!(build(&lengths, ROOT_BITS_CODE_LENGTH).is_err());
    }

    #[test]
    fn round_trips_simple_three_symbol_code() {
        // Lengths 1,2,2 for symbols 0,1,2: a complete code.
        let lengths = [1u8, 2, 2];
        let table = build(&lengths, ROOT_BITS_CODE_LENGTH).unwrap();

        // Canonical codes: symbol0 len1 code0 -> bit '0'
        // symbol1 len2 code2(=0b10) -> bits '01' reversed order when read LSB-first
        // symbol2 len2 code3(=0b11) -> bits '11'
        let mut w = BitWriter::new();
        w.write_bits(0, 1); // symbol 0
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        assert_eq!(decode_one(&table, ROOT_BITS_CODE_LENGTH, &mut r), 0);
    }
}
