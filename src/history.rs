//! Branch history: outcome registers and address history.

pub mod address;
pub use address::*;

use bitvec::prelude::*;
use crate::branch::Outcome;
use crate::error::ConfigError;

/// A shift register of recent branch outcomes.
///
/// Bit 0 is the most recent outcome and bit `i` is the outcome observed `i`
/// branches ago. The register is exactly `len` bits wide: older outcomes are
/// shifted out the top and never alias back into the low bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalHistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the oldest (index n) and the rightmost
// bit is the most recent (index 0).
impl std::fmt::Display for GlobalHistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl GlobalHistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        Ok(Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        })
    }

    /// Width of the register in bits.
    pub fn len(&self) -> usize { self.len }

    /// Number of bytes needed to hold the register.
    pub fn storage_bytes(&self) -> usize { self.len.div_ceil(8) }

    pub fn data(&self) -> &BitSlice<usize, Lsb0> { self.data.as_bitslice() }

    /// Shift a new outcome into bit 0.
    /// The oldest outcome (bit `len - 1`) is discarded.
    pub fn push(&mut self, outcome: Outcome) {
        if self.len > 1 {
            self.data.shift_right(1);
        }
        self.data.set(0, outcome.into());
    }

    /// Returns the outcome recorded `i` branches ago as a bit.
    /// Positions beyond the width of the register always read as zero.
    pub fn bit(&self, i: usize) -> bool {
        self.data.get(i).map(|b| *b).unwrap_or(false)
    }

    /// Returns the outcome recorded `i` branches ago.
    pub fn outcome(&self, i: usize) -> Outcome {
        Outcome::from(self.bit(i))
    }

    /// Return the lowest `n` bits of the register as an integer.
    pub fn low_bits(&self, n: usize) -> usize {
        let n = n.min(self.len).min(usize::BITS as usize);
        if n == 0 {
            return 0;
        }
        self.data[..n].load_le::<usize>()
    }

    /// Clear all bits.
    pub fn reset(&mut self) {
        self.data.fill(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_width_is_rejected() {
        assert!(matches!(GlobalHistoryRegister::new(0),
            Err(ConfigError::ZeroHistory)));
    }

    #[test]
    fn push_shifts_and_masks() {
        let mut ghr = GlobalHistoryRegister::new(4).unwrap();
        for o in [Outcome::T, Outcome::T, Outcome::N, Outcome::T] {
            ghr.push(o);
        }
        assert_eq!(ghr.to_string(), "1101");
        assert_eq!(ghr.low_bits(4), 0b1101);

        // The oldest 'T' falls off the top
        ghr.push(Outcome::N);
        assert_eq!(ghr.to_string(), "1010");
        assert_eq!(ghr.low_bits(4), 0b1010);
        assert!(!ghr.bit(4));
        assert!(!ghr.bit(64));
    }

    #[test]
    fn single_bit_register() {
        let mut ghr = GlobalHistoryRegister::new(1).unwrap();
        ghr.push(Outcome::T);
        assert!(ghr.bit(0));
        ghr.push(Outcome::N);
        assert!(!ghr.bit(0));
        assert_eq!(ghr.storage_bytes(), 1);
    }

    #[test]
    fn wide_registers_are_not_truncated() {
        let mut ghr = GlobalHistoryRegister::new(100).unwrap();
        ghr.push(Outcome::T);
        for _ in 0..98 {
            ghr.push(Outcome::N);
        }
        assert!(ghr.bit(98));
        assert_eq!(ghr.storage_bytes(), 13);
        ghr.push(Outcome::N);
        assert!(ghr.bit(99));
        ghr.push(Outcome::N);
        assert!(ghr.data().not_any());
    }

    proptest! {
        #[test]
        fn bits_reconstruct_pushed_outcomes(
            seq in proptest::collection::vec(any::<bool>(), 1..80)
        ) {
            let len = seq.len();
            let mut ghr = GlobalHistoryRegister::new(len).unwrap();
            for b in seq.iter() {
                ghr.push(Outcome::from(*b));
            }
            for i in 0..len {
                prop_assert_eq!(ghr.bit(i), seq[len - 1 - i]);
            }
        }
    }
}
