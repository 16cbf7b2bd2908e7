//! Approximate set membership and distinct counting over strings.
//!
//! - [`BloomFilter`](set_membership::BloomFilter) flags strings that were
//!   (probably) seen before; [`password`] builds password screening on it.
//! - [`HyperLogLog`](cardinality::HyperLogLog) estimates how many distinct
//!   strings went through it; [`ingest`] feeds it from an NDJSON log.
//!
//! ```
//! use probably::cardinality::HyperLogLog;
//! use probably::password::{classify, Status};
//! use probably::set_membership::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1000, 3)?;
//! filter.insert("admin123");
//! let results = classify(&mut filter, ["admin123", "guest"]);
//! assert_eq!(results[0].1, Status::Duplicate);
//!
//! let mut hll = HyperLogLog::new(14)?;
//! for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.1"] {
//!     hll.insert(ip);
//! }
//! assert!((hll.estimate() - 2.).abs() < 0.1);
//! # Ok::<(), probably::Error>(())
//! ```

pub mod cardinality;
pub mod error;
pub mod hash;
pub mod ingest;
pub mod password;
pub mod set_membership;

pub use error::{Error, Result};
