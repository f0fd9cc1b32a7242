//! Compound (custom) dictionary: up to 15 caller-supplied byte chunks
//! attached before decoding, occupying the distance range just beyond the
//! sliding window. A prefix-sum offset table turns "which chunk holds this
//! address" into a binary search.

use crate::error::DecodeError;

pub const MAX_CHUNKS: usize = 15;

pub struct CompoundDictionary<'a> {
    chunks: Vec<&'a [u8]>,
    /// `offsets[i]` is the cumulative size of all chunks before `i`;
    /// `offsets[len]` is the total size.
    offsets: Vec<usize>,
}

impl<'a> CompoundDictionary<'a> {
    pub fn new(chunks: &[&'a [u8]]) -> Result<Self, DecodeError> {
        if chunks.len() > MAX_CHUNKS {
            return Err(DecodeError::ApiMisuse(
                "compound dictionary accepts at most 15 chunks",
            ));
        }
        let mut offsets = Vec::with_capacity(chunks.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for chunk in chunks {
            total += chunk.len();
            offsets.push(total);
        }
        Ok(CompoundDictionary {
            chunks: chunks.to_vec(),
            offsets,
        })
    }

    pub fn empty() -> Self {
        CompoundDictionary {
            chunks: Vec::new(),
            offsets: vec![0],
        }
    }

    pub fn total_size(&self) -> usize {
        *self.offsets.last().unwrap()
    }

    /// Locates the chunk containing byte `address` (0-based within the
    /// compound dictionary's combined address space) in O(log 15).
    fn locate(&self, address: usize) -> Option<(usize, usize)> {
        if address >= self.total_size() {
            return None;
        }
        let chunk_index = self.offsets.partition_point(|&o| o <= address) - 1;
        let local_offset = address - self.offsets[chunk_index];
        Some((chunk_index, local_offset))
    }

    /// Copies `length` bytes starting at compound-dictionary `address` into
    /// `out`. Yields at a chunk boundary only if the requested range spans
    /// more than one chunk, matching the reference decoder's chunk-by-chunk
    /// copy loop.
    pub fn copy(&self, address: usize, length: usize, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        let (mut chunk_index, mut local_offset) = self
            .locate(address)
            .ok_or(DecodeError::InvalidDistance {
                distance: address as u64,
                max: self.total_size() as u64,
            })?;
        let mut remaining = length;
        while remaining > 0 {
            let chunk = self.chunks[chunk_index];
            let available = chunk.len() - local_offset;
            let take = available.min(remaining);
            out.extend_from_slice(&chunk[local_offset..local_offset + take]);
            remaining -= take;
            if remaining > 0 {
                chunk_index += 1;
                local_offset = 0;
                if chunk_index >= self.chunks.len() {
                    return Err(DecodeError::MalformedMetablock(
                        "compound dictionary copy runs past the last chunk",
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_many_chunks() {
        let chunk = b"x".as_slice();
        let chunks: Vec<&[u8]> = std::iter::repeat(chunk).take(16).collect();
        assert!(CompoundDictionary::new(&chunks).is_err());
    }

    #[test]
    fn locates_address_within_single_chunk() {
        let a: &[u8] = b"hello";
        let b: &[u8] = b"world";
        let dict = CompoundDictionary::new(&[a, b]).unwrap();
        let mut out = Vec::new();
        dict.copy(6, 3, &mut out).unwrap();
        assert_eq!(out, b"orl");
    }

    #[test]
    fn copy_spanning_chunk_boundary() {
        let a: &[u8] = b"abc";
        let b: &[u8] = b"def";
        let dict = CompoundDictionary::new(&[a, b]).unwrap();
        let mut out = Vec::new();
        dict.copy(1, 4, &mut out).unwrap();
        assert_eq!(out, b"bcde");
    }

    #[test]
    fn out_of_range_address_errors() {
        let a: &[u8] = b"abc";
        let dict = CompoundDictionary::new(&[a]).unwrap();
        let mut out = Vec::new();
        assert!(dict.copy(10, 1, &mut out).is_err());
    }
}
