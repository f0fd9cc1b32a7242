//! On-wire encoding of a Huffman tree's code lengths: an 18-symbol alphabet
//! (literal lengths 0-15 plus two repeat codes) run-length-coded and itself
//! Huffman-coded with a small meta-tree, mirroring how RFC 7932 transmits
//! each cluster's Huffman trees inside a metablock header.

use crate::bitio::{BitReader, BitWriter};
use crate::error::DecodeError;
use crate::huffman::build::{assign_canonical_codes, build_code_lengths};
use crate::huffman::decode_table::{self, entry_bits, entry_symbol};

const REPEAT_PREVIOUS: u8 = 16;
const REPEAT_ZERO: u8 = 17;
const ALPHABET_SIZE: usize = 18;
const META_MAX_DEPTH: u32 = decode_table::ROOT_BITS_CODE_LENGTH as u32 + 2;

/// The order in which the 18 meta-tree code lengths are written: groups the
/// common short lengths first so the trailing-zero trim below cuts the most.
const STORAGE_ORDER: [u8; 18] = [
    1, 2, 3, 4, 0, 5, 17, 6, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Expands `depths` (one entry per symbol, 0 = unused) into the RLE token
/// stream: each token is `(symbol in 0..=17, extra_bit_count, extra_value)`.
fn rle_tokens(depths: &[u8]) -> Vec<(u8, u32, u32)> {
    let mut out = Vec::new();
    let mut i = 0;
    let n = depths.len();
    while i < n {
        let value = depths[i];
        let mut run = 1;
        while i + run < n && depths[i + run] == value {
            run += 1;
        }
        if value == 0 {
            let mut remaining = run;
            while remaining > 0 {
                if remaining < 3 {
                    out.push((0, 0, 0));
                    remaining -= 1;
                } else {
                    let chunk = remaining.min(10);
                    out.push((REPEAT_ZERO, 3, (chunk - 3) as u32));
                    remaining -= chunk;
                }
            }
        } else {
            out.push((value, 0, 0));
            let mut remaining = run - 1;
            while remaining > 0 {
                if remaining < 3 {
                    out.push((value, 0, 0));
                    remaining -= 1;
                } else {
                    let chunk = remaining.min(6);
                    out.push((REPEAT_PREVIOUS, 2, (chunk - 3) as u32));
                    remaining -= chunk;
                }
            }
        }
        i += run;
    }
    out
}

/// Writes `depths` as a meta-Huffman-coded, run-length-compressed stream.
pub fn write(writer: &mut BitWriter, depths: &[u8]) {
    let tokens = rle_tokens(depths);

    let mut freqs = [0u32; ALPHABET_SIZE];
    for &(sym, _, _) in &tokens {
        freqs[sym as usize] += 1;
    }
    let meta_depths = build_code_lengths(&freqs, META_MAX_DEPTH);
    let meta_codes = assign_canonical_codes(&meta_depths);

    let ordered: Vec<u8> = STORAGE_ORDER
        .iter()
        .map(|&sym| meta_depths[sym as usize])
        .collect();
    let mut num_codes = ALPHABET_SIZE;
    while num_codes > 1 && ordered[num_codes - 1] == 0 {
        num_codes -= 1;
    }
    writer.write_bits(num_codes as u64, 5);
    for &d in &ordered[..num_codes] {
        writer.write_bits(d as u64, 3);
    }

    for &(sym, extra_bits, extra_value) in &tokens {
        let (code, len) = meta_codes[sym as usize];
        writer.write_bits(code as u64, len as u32);
        if extra_bits > 0 {
            writer.write_bits(extra_value as u64, extra_bits);
        }
    }
}

/// Reads back a code-length stream written by [`write`] into `num_symbols`
/// code lengths.
pub fn read(reader: &mut BitReader, num_symbols: usize) -> Result<Vec<u8>, DecodeError> {
    let num_codes = reader.read_bits(5)? as usize;
    if num_codes == 0 || num_codes > ALPHABET_SIZE {
        return Err(DecodeError::MalformedHuffman(
            "meta-tree code count out of range",
        ));
    }
    let mut meta_depths = [0u8; ALPHABET_SIZE];
    for i in 0..num_codes {
        let d = reader.read_bits(3)? as u8;
        meta_depths[STORAGE_ORDER[i] as usize] = d;
    }
    let meta_table = decode_table::build(&meta_depths, decode_table::ROOT_BITS_CODE_LENGTH)?;

    let mut depths = vec![0u8; num_symbols];
    let mut i = 0usize;
    let mut prev_nonzero = 8u8;
    while i < num_symbols {
        let peek = reader.peek_bits(decode_table::ROOT_BITS_CODE_LENGTH)?;
        let entry = meta_table[peek as usize];
        let bits = entry_bits(entry);
        reader.skip_bits(bits.min(decode_table::ROOT_BITS_CODE_LENGTH))?;
        let symbol = if bits <= decode_table::ROOT_BITS_CODE_LENGTH {
            entry_symbol(entry)
        } else {
            let sub_bits = bits - decode_table::ROOT_BITS_CODE_LENGTH;
            let sub_peek = reader.peek_bits(sub_bits)?;
            let sub_entry = meta_table[entry_symbol(entry) as usize + sub_peek as usize];
            reader.skip_bits(entry_bits(sub_entry))?;
            entry_symbol(sub_entry)
        };

        match symbol as u8 {
            REPEAT_ZERO => {
                let extra = reader.read_bits(3)?;
                let run = 3 + extra as usize;
                for _ in 0..run {
                    if i >= num_symbols {
                        return Err(DecodeError::MalformedHuffman(
                            "repeat-zero run overruns symbol count",
                        ));
                    }
                    depths[i] = 0;
                    i += 1;
                }
            }
            REPEAT_PREVIOUS => {
                let extra = reader.read_bits(2)?;
                let run = 3 + extra as usize;
                for _ in 0..run {
                    if i >= num_symbols {
                        return Err(DecodeError::MalformedHuffman(
                            "repeat-previous run overruns symbol count",
                        ));
                    }
                    depths[i] = prev_nonzero;
                    i += 1;
                }
            }
            d => {
                depths[i] = d;
                if d != 0 {
                    prev_nonzero = d;
                }
                i += 1;
            }
        }
    }
    Ok(depths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_flat_distribution() {
        let depths: Vec<u8> = (0..40).map(|i| 1 + (i % 6) as u8).collect();
        let mut w = BitWriter::new();
        write(&mut w, &depths);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let back = read(&mut r, depths.len()).unwrap();
        assert_eq!(back, depths);
    }

    #[test]
    fn round_trips_with_long_zero_run() {
        let mut depths = vec![0u8; 50];
        depths[0] = 3;
        depths[49] = 5;
        let mut w = BitWriter::new();
        write(&mut w, &depths);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let back = read(&mut r, depths.len()).unwrap();
        assert_eq!(back, depths);
    }

    #[test]
    fn round_trips_with_repeated_nonzero_run() {
        let mut depths = vec![4u8; 30];
        depths[0] = 2;
        depths[29] = 6;
        let mut w = BitWriter::new();
        write(&mut w, &depths);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let back = read(&mut r, depths.len()).unwrap();
        assert_eq!(back, depths);
    }
}
