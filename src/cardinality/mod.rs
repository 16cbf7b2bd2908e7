pub mod hash_set;
pub mod hll;

pub use hll::HyperLogLog;

/// Approximate or exact count of distinct strings.
pub trait Cardinality {
    fn count(&self) -> f64;
    fn insert(&mut self, item: &str);
}
