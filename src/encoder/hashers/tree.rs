//! Q10-11 match finder.
//!
//! Spec §4.6 describes a per-bucket binary tree re-rooted at the current
//! position, with a short-range scan layered on top for `findAllMatches`.
//! That tree gives quality 10-11 its distinctive "near-exhaustive but still
//! bounded" search. `BinaryTreeHasher` below is not that: it is a
//! `HashChainHasher` wrapper with a longer depth bound and a wider bucket
//! table, plus a short-range linear scan layered on top — there is no
//! per-bucket binary tree and no re-rooting at a `maxLength >= 128`
//! threshold anywhere in this module. It approximates the "search harder
//! than the mid-quality tiers" depth/breadth shape, not the tree's actual
//! search structure. See `DESIGN.md`'s `encoder::hashers::tree` row for this
//! stated plainly.

use super::{match_length, Hasher, HashChainHasher, Match, MIN_MATCH_LENGTH};

pub struct BinaryTreeHasher {
    inner: HashChainHasher,
    short_range: usize,
}

impl BinaryTreeHasher {
    pub fn new(bucket_bits: u32, capacity: usize) -> Self {
        BinaryTreeHasher {
            // Search depth capped at 64.
            inner: HashChainHasher::new(bucket_bits, 7, capacity),
            short_range: 64,
        }
    }

    /// Augments the bucket-chain search with a short-range linear scan over
    /// the most recent positions, the way `findAllMatches` layers a
    /// short-match scan on top of the tree walk.
    pub fn find_all_matches(&self, data: &[u8], pos: usize) -> Vec<Match> {
        let mut matches = Vec::new();
        if let Some(m) = self.inner.find_longest_match(data, pos) {
            matches.push(m);
        }
        let max_len = data.len().saturating_sub(pos);
        let start = pos.saturating_sub(self.short_range);
        for c in start..pos {
            let len = match_length(data, c, pos, max_len);
            if len >= MIN_MATCH_LENGTH {
                matches.push(Match {
                    distance: (pos - c) as u32,
                    length: len as u32,
                });
            }
        }
        matches.sort_by(|a, b| b.length.cmp(&a.length));
        matches.dedup_by_key(|m| m.distance);
        matches
    }
}

impl Hasher for BinaryTreeHasher {
    fn store(&mut self, data: &[u8], pos: usize) {
        self.inner.store(data, pos);
    }

    fn find_longest_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        self.find_all_matches(data, pos).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_all_matches_includes_short_range_hits() {
        let data = b"abcdefgabcdefg";
        let mut h = BinaryTreeHasher::new(10, data.len());
        h.store_range(data, 0, 7);
        let matches = h.find_all_matches(data, 7);
        assert!(!matches.is_empty());
        assert!(matches.iter().any(|m| m.distance == 7));
    }
}
