//! Hash functions shared by the sketches.
//!
//! The Bloom filter derives its bit positions from keyed SHA-256 digests, while
//! HyperLogLog only needs one fast 64-bit hash, abstracted as [`Hash64`].

use sha2::{Digest, Sha256};
use std::hash::{BuildHasher, Hasher};
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// A deterministic 64-bit hash over raw bytes.
///
/// Swapping implementations keeps estimates statistically valid but changes
/// the exact number produced for a given input set.
pub trait Hash64 {
    fn hash64(&self, bytes: &[u8]) -> u64;
}

/// XXH3 64-bit hash, optionally seeded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Xxh3 {
    seed: Option<u64>,
}

impl Xxh3 {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl Hash64 for Xxh3 {
    #[inline]
    fn hash64(&self, bytes: &[u8]) -> u64 {
        match self.seed {
            Some(seed) => xxh3_64_with_seed(bytes, seed),
            None => xxh3_64(bytes),
        }
    }
}

/// Adapts a [`BuildHasher`] into a [`Hash64`].
///
/// Only reproducible across runs if the underlying hasher is, so avoid
/// `RandomState` here.
#[derive(Debug, Default, Clone)]
pub struct BuildHasher64<H>(pub H);

impl<H: BuildHasher> Hash64 for BuildHasher64<H> {
    fn hash64(&self, bytes: &[u8]) -> u64 {
        let mut hasher = self.0.build_hasher();
        hasher.write(bytes);
        hasher.finish()
    }
}

/// Bit positions of an item in a table of `size` bits.
///
/// Position `i` is `SHA-256(item || i as u16 little-endian)`, read as a
/// big-endian integer, modulo `size`.
pub(crate) struct KeyedDigests<'a> {
    item: &'a [u8],
    size: u64,
    index: usize,
    num_hashes: usize,
}

impl<'a> KeyedDigests<'a> {
    pub fn new(item: &'a [u8], size: u64, num_hashes: usize) -> Self {
        debug_assert!(size > 0);
        Self {
            item,
            size,
            index: 0,
            num_hashes,
        }
    }
}

impl Iterator for KeyedDigests<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.num_hashes {
            return None;
        }
        let key = (self.index as u16).to_le_bytes();
        self.index += 1;

        let digest = Sha256::new()
            .chain_update(self.item)
            .chain_update(key)
            .finalize();
        Some(reduce_be(&digest, self.size) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.num_hashes - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for KeyedDigests<'_> {}

/// Remainder of a big-endian unsigned integer divided by `modulus`.
fn reduce_be(bytes: &[u8], modulus: u64) -> u64 {
    let modulus = modulus as u128;
    bytes
        .iter()
        .fold(0u128, |acc, &b| ((acc << 8) | b as u128) % modulus) as u64
}
