//! Context map: the per-block-type table mapping a context id to a cluster
//! (Huffman tree) index, transmitted with the same zero-run RLE as code
//! lengths plus an inverse-move-to-front permutation on top.

use crate::bitio::{BitReader, BitWriter};
use crate::error::DecodeError;
use crate::huffman::build::{assign_canonical_codes, build_code_lengths};
use crate::huffman::code_length;

const RLEMAX_RUN_LENGTH_EXTRA_BITS: u32 = 8;

/// Applies inverse-move-to-front decoding in place: each value is an index
/// into a recency list that starts as `[0, 1, 2, ...]`; decoding replaces
/// the index with the list entry it names and moves that entry to front.
fn inverse_move_to_front(values: &mut [u32], alphabet_size: usize) {
    let mut mtf: Vec<u32> = (0..alphabet_size as u32).collect();
    for v in values.iter_mut() {
        let index = *v as usize;
        let value = mtf[index];
        mtf.copy_within(0..index, 1);
        mtf[0] = value;
        *v = value;
    }
}

/// Move-to-front encoding (the inverse of [`inverse_move_to_front`]):
/// replaces each cluster id with its current position in the recency list.
fn move_to_front(values: &mut [u32], alphabet_size: usize) {
    let mut mtf: Vec<u32> = (0..alphabet_size as u32).collect();
    for v in values.iter_mut() {
        let value = *v;
        let index = mtf.iter().position(|&x| x == value).expect("value in range");
        mtf.copy_within(0..index, 1);
        mtf[0] = value;
        *v = index as u32;
    }
}

/// Decodes a context map of `context_count` entries over `num_clusters`
/// clusters. The wire format is: an IMTF-enable bit, then each entry is
/// either a literal cluster id (shifted up past the RLE marker range) or a
/// run-length-coded zero run, all drawn from one Huffman tree sized
/// `num_clusters + RLEMAX_RUN_LENGTH_EXTRA_BITS`, finally passed through
/// inverse-move-to-front if enabled.
pub fn decode(
    reader: &mut BitReader,
    context_count: usize,
    num_clusters: usize,
) -> Result<Vec<u32>, DecodeError> {
    if num_clusters == 1 {
        return Ok(vec![0; context_count]);
    }
    let alphabet_size = num_clusters + RLEMAX_RUN_LENGTH_EXTRA_BITS as usize;
    let code_lengths = code_length::read(reader, alphabet_size)?;
    let table = crate::huffman::decode_table::build(
        &code_lengths,
        crate::huffman::decode_table::ROOT_BITS_MAIN,
    )?;

    let mut out = Vec::with_capacity(context_count);
    while out.len() < context_count {
        let symbol = decode_symbol(reader, &table)?;
        if symbol == 0 {
            out.push(0);
        } else if (symbol as usize) <= RLEMAX_RUN_LENGTH_EXTRA_BITS as usize {
            let extra = reader.read_bits(symbol)?;
            let run = (1u32 << symbol) + extra;
            for _ in 0..run {
                if out.len() >= context_count {
                    return Err(DecodeError::MalformedContextMap(
                        "zero run overruns context map length",
                    ));
                }
                out.push(0);
            }
        } else {
            out.push(symbol - RLEMAX_RUN_LENGTH_EXTRA_BITS);
        }
    }

    let use_imtf = reader.read_bits(1)? != 0;
    if use_imtf {
        inverse_move_to_front(&mut out, num_clusters);
    }
    for &v in &out {
        if v as usize >= num_clusters {
            return Err(DecodeError::MalformedContextMap(
                "context map entry names a cluster that doesn't exist",
            ));
        }
    }
    Ok(out)
}

fn decode_symbol(reader: &mut BitReader, table: &[u32]) -> Result<u32, DecodeError> {
    use crate::huffman::decode_table::{entry_bits, entry_symbol, ROOT_BITS_MAIN};
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

/// Encodes `map` (one cluster id per context, all `< num_clusters`) using
/// move-to-front plus zero-run RLE, mirroring [`decode`].
pub fn encode(writer: &mut BitWriter, map: &[u32], num_clusters: usize) {
    if num_clusters <= 1 {
        return;
    }
    let mut mtf_coded = map.to_vec();
    move_to_front(&mut mtf_coded, num_clusters);

    let mut tokens: Vec<(u32, u32, u32)> = Vec::new();
    let mut i = 0;
    while i < mtf_coded.len() {
        if mtf_coded[i] == 0 {
            let mut run = 1;
            while i + run < mtf_coded.len() && mtf_coded[i + run] == 0 {
                run += 1;
            }
            let mut remaining = run as u32;
            while remaining > 0 {
                let bits = 31 - remaining.leading_zeros();
                let bits = bits.min(RLEMAX_RUN_LENGTH_EXTRA_BITS);
                let chunk = 1u32 << bits;
                if remaining < chunk {
                    tokens.push((0, 0, 0));
                    remaining -= 1;
                } else {
                    let extra = remaining - chunk;
                    tokens.push((bits, bits, extra));
                    remaining = 0;
                }
            }
            i += run;
        } else {
            tokens.push((mtf_coded[i] + RLEMAX_RUN_LENGTH_EXTRA_BITS, 0, 0));
            i += 1;
        }
    }

    let alphabet_size = num_clusters + RLEMAX_RUN_LENGTH_EXTRA_BITS as usize;
    let mut freqs = vec![0u32; alphabet_size];
    for &(sym, _, _) in &tokens {
        freqs[sym as usize] += 1;
    }
    let depths = build_code_lengths(&freqs, 15);
    let codes = assign_canonical_codes(&depths);
    code_length::write(writer, &depths);

    for &(sym, extra_bits, extra_value) in &tokens {
        let (code, len) = codes[sym as usize];
        writer.write_bits(code as u64, len as u32);
        if extra_bits > 0 {
            writer.write_bits(extra_value as u64, extra_bits);
        }
    }
    writer.write_bits(1, 1); // IMTF always enabled on the encode side.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imtf_round_trip() {
        let mut values = vec![0u32, 1, 0, 2, 0];
        let original = values.clone();
        move_to_front(&mut values, 4);
        inverse_move_to_front(&mut values, 4);
        assert_eq!(values, original);
    }

    #[test]
    fn single_cluster_skips_wire_format() {
        let data = [0u8; 4];
        let mut r = BitReader::new(&data);
        let map = decode(&mut r, 10, 1).unwrap();
        assert_eq!(map, vec![0; 10]);
    }

    #[test]
    fn encode_decode_round_trip() {
        let map = vec![0u32, 0, 1, 2, 2, 2, 0, 3, 1];
        let mut w = BitWriter::new();
        encode(&mut w, &map, 4);
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        let back = decode(&mut r, map.len(), 4).unwrap();
        assert_eq!(back, map);
    }
}
