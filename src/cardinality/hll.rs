use crate::cardinality::Cardinality;
use crate::error::{ensure_arg, Result};
use crate::hash::{Hash64, Xxh3};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::ops::RangeInclusive;

/// Supported values of the precision parameter.
pub const PRECISION_RANGE: RangeInclusive<u32> = 4..=24;

const HASH_BITS: u32 = u64::BITS;

/// HyperLogLog distinct counter over strings.
///
/// The low `precision` bits of a 64-bit hash select one of `m = 2^precision`
/// registers; each register keeps the largest `rho` (leading zeros plus one)
/// seen among the remaining bits. The relative standard error is about
/// `1.04 / sqrt(m)`.
#[derive(Clone)]
pub struct HyperLogLog<H = Xxh3> {
    registers: Vec<u8>,
    precision: u32,
    alpha: f64,
    hasher: H,
}

impl HyperLogLog {
    pub fn new(precision: u32) -> Result<Self> {
        Self::with_hasher(precision, Xxh3::default())
    }

    /// Picks the smallest precision whose standard error is at most `epsilon`.
    pub fn with_error(epsilon: f64) -> Result<Self> {
        ensure_arg!(
            0.0 < epsilon && epsilon < 1.0,
            "epsilon must be in the range (0, 1)"
        );
        let m = (1.04 / epsilon).powi(2);
        let precision = (m.log2().ceil() as u32).max(*PRECISION_RANGE.start());
        Self::new(precision)
    }
}

impl<H: Hash64> HyperLogLog<H> {
    pub fn with_hasher(precision: u32, hasher: H) -> Result<Self> {
        ensure_arg!(
            PRECISION_RANGE.contains(&precision),
            "precision must be in the range [{}, {}], got {precision}",
            PRECISION_RANGE.start(),
            PRECISION_RANGE.end()
        );
        let m = 1usize << precision;
        debug!("new HyperLogLog: precision={precision}, registers={m}");
        Ok(Self {
            registers: vec![0; m],
            precision,
            alpha: alpha(precision),
            hasher,
        })
    }

    pub fn insert(&mut self, item: &str) {
        self.insert_hash(self.hasher.hash64(item.as_bytes()));
    }

    /// Estimated number of distinct items inserted so far.
    pub fn estimate(&self) -> f64 {
        let (zeros, z) = self
            .registers
            .iter()
            .fold((0usize, 0f64), |(zeros, z), &register| {
                (
                    zeros + (register == 0) as usize,
                    z + 2f64.powi(-(register as i32)),
                )
            });
        let m = self.registers.len() as f64;
        let estimate = self.alpha * m * m / z;

        if estimate <= 2.5 * m && zeros > 0 {
            m * (m / zeros as f64).ln()
        } else {
            estimate
        }
    }
}

impl<H> HyperLogLog<H> {
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn zero_registers(&self) -> usize {
        self.registers.iter().filter(|&&r| r == 0).count()
    }

    /// Relative standard error of the estimate.
    pub fn relative_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    fn insert_hash(&mut self, hash: u64) {
        let index = (hash & (self.registers.len() as u64 - 1)) as usize;
        let rho = rho(hash >> self.precision, self.precision);
        let register = &mut self.registers[index];
        if rho > *register {
            *register = rho;
        }
    }
}

impl<H: Hash64> Cardinality for HyperLogLog<H> {
    fn count(&self) -> f64 {
        self.estimate()
    }

    fn insert(&mut self, item: &str) {
        HyperLogLog::insert(self, item);
    }
}

impl<H> Debug for HyperLogLog<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HyperLogLog {{ precision: {} }}", self.precision)
    }
}

fn alpha(precision: u32) -> f64 {
    match precision {
        4 => 0.673,
        5 => 0.697,
        6 => 0.709,
        _ => 0.7213 / (1. + 1.079 / (1u64 << precision) as f64),
    }
}

/// Leading zeros of `w` within its `64 - precision` significant bits, plus one.
///
/// An all-zero remainder yields the full hash width rather than
/// `64 - precision + 1`.
fn rho(w: u64, precision: u32) -> u8 {
    if w == 0 {
        return HASH_BITS as u8;
    }
    (w.leading_zeros() - precision + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hash::BuildHasher64;
    use std::hash::{BuildHasherDefault, DefaultHasher};

    #[test]
    fn test_precision_range() {
        for precision in [0, 3, 25, 64] {
            assert!(matches!(
                HyperLogLog::new(precision),
                Err(Error::InvalidArgument(_))
            ));
        }
        for precision in [4, 14, 24] {
            assert_eq!(HyperLogLog::new(precision).unwrap().precision(), precision);
        }
    }

    #[test]
    fn test_num_registers() {
        assert_eq!(HyperLogLog::new(4).unwrap().num_registers(), 16);
        assert_eq!(HyperLogLog::new(14).unwrap().num_registers(), 16384);
    }

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(4), 0.673);
        assert_eq!(alpha(5), 0.697);
        assert_eq!(alpha(6), 0.709);
        assert_eq!(alpha(7), 0.7213 / (1. + 1.079 / 128.));
        assert_eq!(alpha(14), 0.7213 / (1. + 1.079 / 16384.));
    }

    #[test]
    fn test_rho() {
        // Top `precision` bits are always clear after the shift.
        assert_eq!(rho(1 << 59, 4), 1);
        assert_eq!(rho(1 << 58, 4), 2);
        assert_eq!(rho(1, 4), 60);
        assert_eq!(rho(u64::MAX >> 10, 10), 1);
        assert_eq!(rho(0, 4), 64);
        assert_eq!(rho(0, 14), 64);
    }

    #[test]
    fn test_insert_hash_splits_index_and_remainder() {
        let mut hll = HyperLogLog::new(4).unwrap();

        // index 0b0101, remainder has its top significant bit set
        hll.insert_hash((1 << 63) | 0b0101);
        assert_eq!(hll.registers()[5], 1);

        // index 0b0101, remainder is 1
        hll.insert_hash((1 << 4) | 0b0101);
        assert_eq!(hll.registers()[5], 60);

        // smaller rho never lowers a register
        hll.insert_hash((1 << 62) | 0b0101);
        assert_eq!(hll.registers()[5], 60);

        // zero remainder
        hll.insert_hash(0b0011);
        assert_eq!(hll.registers()[3], 64);
        assert_eq!(hll.zero_registers(), 14);
    }

    #[test]
    fn test_empty_estimate_is_zero() {
        let hll = HyperLogLog::new(10).unwrap();
        assert_eq!(hll.estimate(), 0.);
    }

    #[test]
    fn test_small_range() {
        let mut hll = HyperLogLog::new(14).unwrap();
        for i in 0..100 {
            hll.insert(&format!("192.168.0.{i}"));
        }
        let estimate = hll.estimate();
        assert!((95. ..=105.).contains(&estimate), "estimate {estimate}");
    }

    #[test]
    fn test_duplicates_do_not_count() {
        let mut hll = HyperLogLog::new(12).unwrap();
        for _ in 0..10 {
            for i in 0..1000 {
                hll.insert(&format!("10.0.{}.{}", i / 256, i % 256));
            }
        }
        let estimate = hll.estimate();
        assert!((900. ..1100.).contains(&estimate), "estimate {estimate}");
    }

    #[test]
    fn test_with_error() {
        assert_eq!(HyperLogLog::with_error(0.01).unwrap().precision(), 14);
        assert_eq!(HyperLogLog::with_error(0.5).unwrap().precision(), 4);
        assert!(HyperLogLog::with_error(0.).is_err());
        assert!(HyperLogLog::with_error(1e-5).is_err());
    }

    #[test]
    fn test_custom_hasher() {
        let hasher = BuildHasher64(BuildHasherDefault::<DefaultHasher>::default());
        let mut hll = HyperLogLog::with_hasher(12, hasher).unwrap();
        for i in 0..5000 {
            hll.insert(&i.to_string());
        }
        let estimate = hll.estimate();
        assert!((4500. ..5500.).contains(&estimate), "estimate {estimate}");
    }

    #[test]
    fn test_debug() {
        let hll = HyperLogLog::new(14).unwrap();
        assert_eq!(format!("{hll:?}"), "HyperLogLog { precision: 14 }");
    }
}
