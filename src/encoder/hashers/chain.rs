//! Bucket-head-plus-chain hasher used at mid quality tiers: each bucket
//! points at the most recent position with that prefix hash, and each
//! stored position points back to the previous one sharing its bucket, so a
//! lookup walks a chain of candidates bounded by `2^blockBits`.

use super::{hash5, match_length, Hasher, Match, MIN_MATCH_LENGTH};

const SENTINEL: u32 = u32::MAX;

pub struct HashChainHasher {
    bucket_bits: u32,
    max_chain: usize,
    heads: Vec<u32>,
    chain: Vec<u32>,
}

impl HashChainHasher {
    /// `quality` sets the chain depth bound: `2^(quality-1)`.
    pub fn new(bucket_bits: u32, quality: u8, capacity: usize) -> Self {
        HashChainHasher {
            bucket_bits,
            max_chain: 1usize << quality.saturating_sub(1).min(20),
            heads: vec![SENTINEL; 1 << bucket_bits],
            chain: vec![SENTINEL; capacity],
        }
    }
}

impl Hasher for HashChainHasher {
    fn store(&mut self, data: &[u8], pos: usize) {
        if pos + 5 > data.len() {
            return;
        }
        let bucket = hash5(data, pos, self.bucket_bits) as usize;
        if pos >= self.chain.len() {
            self.chain.resize(pos + 1, SENTINEL);
        }
        self.chain[pos] = self.heads[bucket];
        self.heads[bucket] = pos as u32;
    }

    fn find_longest_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        if pos + 5 > data.len() {
            return None;
        }
        let bucket = hash5(data, pos, self.bucket_bits) as usize;
        let max_len = data.len() - pos;
        let mut best: Option<Match> = None;
        let mut candidate = self.heads[bucket];
        let mut steps = 0;
        while candidate != SENTINEL && (candidate as usize) < pos && steps < self.max_chain {
            let c = candidate as usize;
            let len = match_length(data, c, pos, max_len);
            if len >= MIN_MATCH_LENGTH && best.map_or(true, |b| len as u32 > b.length) {
                best = Some(Match {
                    distance: (pos - c) as u32,
                    length: len as u32,
                });
            }
            candidate = self.chain.get(c).copied().unwrap_or(SENTINEL);
            steps += 1;
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_longer_of_two_candidates() {
        let data = b"xx__abcxx__abcdefxx__abc";
        let mut h = HashChainHasher::new(12, 7, data.len());
        for i in 0..data.len() - 5 {
            h.store(data, i);
        }
        let m = h.find_longest_match(data, 21).unwrap();
        assert!(m.length >= MIN_MATCH_LENGTH as u32);
    }

    #[test]
    fn respects_chain_depth_bound() {
        let h = HashChainHasher::new(4, 5, 0);
        assert_eq!(h.max_chain, 16);
    }
}
