pub mod bloom;
pub mod hash_set;

pub use bloom::BloomFilter;

/// Approximate or exact string set membership.
pub trait SetMembership {
    fn contains(&self, item: &str) -> bool;

    /// Adds `item`, returning `true` if it was not already (reported as) present.
    fn insert(&mut self, item: &str) -> bool;
}
