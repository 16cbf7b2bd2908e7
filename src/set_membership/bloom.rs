use crate::error::{ensure_arg, Result};
use crate::hash::KeyedDigests;
use crate::set_membership::SetMembership;
use fixedbitset::FixedBitSet;
use log::debug;
use std::f64::consts::LN_2;
use std::fmt::{Debug, Formatter};

/// Largest number of hash functions; the hash index is encoded on two bytes.
pub const MAX_HASHES: usize = u16::MAX as usize + 1;

/// A Bloom filter over strings.
///
/// Each item maps to `num_hashes` positions, derived from SHA-256 digests of
/// the item bytes followed by the little-endian 16-bit hash index. Bits are
/// only ever set, so an inserted item always tests positive; items never
/// inserted may test positive too, at a rate given by
/// [`false_positive_rate`](Self::false_positive_rate).
#[derive(Clone)]
pub struct BloomFilter {
    bits: FixedBitSet,
    num_hashes: usize,
}

impl BloomFilter {
    pub fn new(size: usize, num_hashes: usize) -> Result<Self> {
        ensure_arg!(size > 0, "size must be > 0");
        ensure_arg!(num_hashes > 0, "num_hashes must be > 0");
        ensure_arg!(
            num_hashes <= MAX_HASHES,
            "num_hashes must be <= {MAX_HASHES}"
        );
        debug!("new Bloom filter: size={size}, num_hashes={num_hashes}");
        Ok(Self {
            bits: FixedBitSet::with_capacity(size),
            num_hashes,
        })
    }

    /// Sizes a filter for `num_items` insertions at the given false positive
    /// probability.
    pub fn with_probability(num_items: usize, probability: f64) -> Result<Self> {
        ensure_arg!(num_items > 0, "num_items must be > 0");
        ensure_arg!(
            0. < probability && probability < 1.,
            "probability must be in the range (0, 1)"
        );
        let n = num_items as f64;
        let size = (-n * probability.ln() / (LN_2 * LN_2)).ceil();
        let num_hashes = (size / n * LN_2).round().max(1.);
        Self::new(size as usize, (num_hashes as usize).min(MAX_HASHES))
    }

    pub fn size(&self) -> usize {
        self.bits.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Whether no bit has been set yet.
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Estimated number of distinct items inserted so far.
    pub fn estimated_len(&self) -> f64 {
        let m = self.bits.len() as f64;
        let k = self.num_hashes as f64;
        let ones = self.count_ones() as f64;
        -m / k * (1. - ones / m).ln()
    }

    /// Expected false positive rate after `num_items` distinct insertions.
    pub fn false_positive_rate(&self, num_items: usize) -> f64 {
        let m = self.bits.len() as f64;
        let k = self.num_hashes as f64;
        (1. - (-k * num_items as f64 / m).exp()).powf(k)
    }

    /// The bit positions `item` maps to, in hash index order.
    pub fn positions<'a>(&self, item: &'a str) -> impl ExactSizeIterator<Item = usize> + 'a {
        KeyedDigests::new(item.as_bytes(), self.bits.len() as u64, self.num_hashes)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.positions(item).all(|bit| self.bits.contains(bit))
    }

    /// Sets every position of `item`. Returns `true` if any bit was clear.
    pub fn insert(&mut self, item: &str) -> bool {
        !self
            .positions(item)
            .fold(true, |acc, bit| acc & self.bits.put(bit))
    }
}

impl SetMembership for BloomFilter {
    fn contains(&self, item: &str) -> bool {
        BloomFilter::contains(self, item)
    }

    fn insert(&mut self, item: &str) -> bool {
        BloomFilter::insert(self, item)
    }
}

impl Debug for BloomFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ size: {}, num_hashes: {} }}",
            self.bits.len(),
            self.num_hashes
        )
    }
}
