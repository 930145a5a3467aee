//! Implementation of a saturating counter.

use crate::branch::Outcome;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Largest value held by the counter (the counter saturates at 0 and
    /// at this value)
    pub max: u8,

    /// Value after construction or reset
    pub init: u8,
}
impl SaturatingCounterConfig {
    /// The classic 2-bit counter starting at "strongly not-taken".
    pub const TWO_BIT: Self = Self { max: 3, init: 0 };

    pub fn storage_bits(&self) -> usize {
        (u8::BITS - self.max.leading_zeros()) as usize
    }
    pub fn build(self) -> SaturatingCounter {
        SaturatingCounter {
            cfg: self,
            ctr: self.init.min(self.max),
        }
    }
}

/// An N-bit unsigned saturating counter used to follow the behavior of a
/// branch. The upper half of the range predicts 'taken'.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    ctr: u8,
}
impl SaturatingCounter {
    pub fn value(&self) -> u8 { self.ctr }

    pub fn increment(&mut self) {
        if self.ctr < self.cfg.max {
            self.ctr += 1;
        }
    }

    pub fn decrement(&mut self) {
        self.ctr = self.ctr.saturating_sub(1);
    }

    /// Return the current predicted direction.
    pub fn predict(&self) -> Outcome {
        Outcome::from(self.ctr > self.cfg.max / 2)
    }

    /// Move the counter toward the resolved outcome.
    pub fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.increment(),
            Outcome::N => self.decrement(),
        }
    }

    pub fn reset(&mut self) {
        self.ctr = self.cfg.init.min(self.cfg.max);
    }
}
