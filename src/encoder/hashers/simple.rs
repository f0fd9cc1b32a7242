//! Single-entry forgetful hash table used at low quality tiers: each bucket
//! remembers only the most recent position with that 5-byte prefix hash, so
//! storing a new position silently evicts whatever used to be there.

use super::{hash5, match_length, Hasher, Match, MIN_MATCH_LENGTH};

const SENTINEL: u32 = u32::MAX;

pub struct SimpleHasher {
    bucket_bits: u32,
    buckets: Vec<u32>,
}

impl SimpleHasher {
    pub fn new(bucket_bits: u32) -> Self {
        SimpleHasher {
            bucket_bits,
            buckets: vec![SENTINEL; 1 << bucket_bits],
        }
    }
}

impl Hasher for SimpleHasher {
    fn store(&mut self, data: &[u8], pos: usize) {
        if pos + 5 > data.len() {
            return;
        }
        let bucket = hash5(data, pos, self.bucket_bits) as usize;
        self.buckets[bucket] = pos as u32;
    }

    fn find_longest_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        if pos + 5 > data.len() {
            return None;
        }
        let bucket = hash5(data, pos, self.bucket_bits) as usize;
        let candidate = self.buckets[bucket];
        if candidate == SENTINEL || candidate as usize >= pos {
            return None;
        }
        let candidate = candidate as usize;
        let max_len = data.len() - pos;
        // Veto on the last byte of the would-be match before paying for the
        // full comparison.
        if max_len >= MIN_MATCH_LENGTH
            && data[candidate + MIN_MATCH_LENGTH - 1] != data[pos + MIN_MATCH_LENGTH - 1]
        {
            return None;
        }
        let len = match_length(data, candidate, pos, max_len);
        if len < MIN_MATCH_LENGTH {
            return None;
        }
        Some(Match {
            distance: (pos - candidate) as u32,
            length: len as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_repeated_run() {
        let data = b"abcdeabcde";
        let mut h = SimpleHasher::new(10);
        h.store_range(data, 0, 5);
        let m = h.find_longest_match(data, 5).unwrap();
        assert_eq!(m.distance, 5);
        assert_eq!(m.length, 5);
    }

    #[test]
    fn no_match_without_prior_store() {
        let data = b"abcdeabcde";
        let h = SimpleHasher::new(10);
        assert!(h.find_longest_match(data, 5).is_none());
    }
}
