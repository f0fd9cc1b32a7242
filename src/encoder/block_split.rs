//! Groups a symbol stream (literals, commands, or distances) into runs that
//! share a block type, so the metablock header can hand each run its own
//! Huffman tree. The reference encoder searches for the split that
//! minimizes total bit cost; this is approximated with a fixed-size
//! chunking pass followed by greedy nearest-histogram clustering, which
//! finds most of the same structure on genuinely non-uniform input without
//! the iterative refinement the reference does.

/// Symbol-frequency table over a fixed alphabet, used both to drive
/// clustering and later handed to `huffman::build` once a block's final
/// type is settled.
#[derive(Clone)]
pub struct Histogram {
    pub counts: Vec<u32>,
    pub total: u64,
}

impl Histogram {
    pub fn new(alphabet_size: usize) -> Self {
        Histogram { counts: vec![0; alphabet_size], total: 0 }
    }

    pub fn add(&mut self, symbol: u32) {
        self.counts[symbol as usize] += 1;
        self.total += 1;
    }

    pub fn merge_from(&mut self, other: &Histogram) {
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
        self.total += other.total;
    }

    /// Approximate bit cost of encoding `other`'s symbols under a tree
    /// shaped by `self`'s distribution: a cross-entropy estimate, cheap to
    /// compute incrementally without building the real canonical code.
    fn cross_entropy_cost(&self, other: &Histogram) -> f64 {
        if other.total == 0 {
            return 0.0;
        }
        let self_total = (self.total + other.total).max(1) as f64;
        let mut bits = 0.0;
        for (i, &c) in other.counts.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let p = (self.counts[i] as f64 + c as f64) / self_total;
            let p = p.max(1e-9);
            bits += c as f64 * -(p.log2());
        }
        bits
    }

    fn standalone_cost(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let mut bits = 0.0;
        for &c in &self.counts {
            if c == 0 {
                continue;
            }
            let p = (c as f64 / total).max(1e-9);
            bits += c as f64 * -(p.log2());
        }
        bits
    }
}

pub struct BlockSplit {
    /// Cluster id for each block, in stream order.
    pub types: Vec<u32>,
    /// Symbol-count length of each block, same order as `types`.
    pub lengths: Vec<u32>,
    pub histograms: Vec<Histogram>,
}

const MERGE_OVERHEAD_BITS: f64 = 64.0;

/// Splits `num_items` symbols (fetched via `symbol_at`) into fixed-size
/// chunks, then greedily assigns each chunk to the existing cluster it is
/// cheapest to join, capped at `max_types` clusters, opening a new cluster
/// only when joining the best existing one costs more than standing alone.
pub fn split<F: Fn(usize) -> u32>(
    num_items: usize,
    chunk_size: usize,
    alphabet_size: usize,
    max_types: usize,
    symbol_at: F,
) -> BlockSplit {
    if num_items == 0 {
        return BlockSplit { types: vec![0], lengths: vec![0], histograms: vec![Histogram::new(alphabet_size)] };
    }

    let mut raw_types = Vec::new();
    let mut raw_lengths = Vec::new();
    let mut clusters: Vec<Histogram> = Vec::new();

    let mut start = 0;
    while start < num_items {
        let end = (start + chunk_size).min(num_items);
        let mut chunk_hist = Histogram::new(alphabet_size);
        for i in start..end {
            chunk_hist.add(symbol_at(i));
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, cluster) in clusters.iter().enumerate() {
            let cost = cluster.cross_entropy_cost(&chunk_hist);
            if best.map_or(true, |(_, b)| cost < b) {
                best = Some((idx, cost));
            }
        }
        let standalone = chunk_hist.standalone_cost() + MERGE_OVERHEAD_BITS;

        let chosen = match best {
            Some((idx, cost)) if cost <= standalone || clusters.len() >= max_types => {
                clusters[idx].merge_from(&chunk_hist);
                idx
            }
            _ => {
                clusters.push(chunk_hist);
                clusters.len() - 1
            }
        };

        raw_types.push(chosen as u32);
        raw_lengths.push((end - start) as u32);
        start = end;
    }

    // Collapse adjacent equal-type runs so the block tracker on the wire
    // sees one (type, length) pair per run rather than per chunk.
    let mut types = Vec::new();
    let mut lengths = Vec::new();
    for (t, l) in raw_types.into_iter().zip(raw_lengths.into_iter()) {
        if types.last() == Some(&t) {
            *lengths.last_mut().unwrap() += l;
        } else {
            types.push(t);
            lengths.push(l);
        }
    }

    BlockSplit { types, lengths, histograms: clusters }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_input_collapses_to_a_single_block() {
        let data = vec![7u32; 200];
        let split = split(data.len(), 32, 16, 4, |i| data[i]);
        assert_eq!(split.types.len(), 1);
        assert_eq!(split.lengths[0], 200);
    }

    #[test]
    fn distinct_regions_produce_multiple_blocks() {
        let mut data = vec![0u32; 64];
        data.extend(vec![1u32; 64]);
        data.extend(vec![0u32; 64]);
        let split = split(data.len(), 32, 4, 4, |i| data[i]);
        assert!(split.types.len() >= 2);
        assert_eq!(split.lengths.iter().sum::<u32>() as usize, data.len());
    }

    #[test]
    fn respects_max_types_cap() {
        let data: Vec<u32> = (0..256).map(|i| (i / 32) as u32).collect();
        let split = split(data.len(), 32, 8, 2, |i| data[i]);
        assert!(split.histograms.len() <= 2);
    }
}
