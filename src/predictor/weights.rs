//! Saturating weight storage for the piecewise-linear predictor.

use crate::error::ConfigError;
use crate::predictor::PredictorTable;

/// Largest magnitude of a weight.
/// The range is symmetric; `i8::MIN` is never produced.
pub const WEIGHT_LIMIT: i8 = 127;

/// Identifies a single weight: the branch being predicted, the address
/// found at some position in the address history, and that position.
///
/// The bias lives at `W[context][0][0]`. History position `i` uses lane `i`,
/// so position 0 on row 0 lands on the bias cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightSlot {
    /// Program counter of the predicted branch
    pub pc: usize,

    /// Address taken from the address history
    pub addr: usize,

    /// Position in the address history, or 0 for the bias
    pub lane: usize,
}
impl WeightSlot {
    pub fn bias(pc: usize) -> Self {
        Self { pc, addr: 0, lane: 0 }
    }
    pub fn history(pc: usize, addr: usize, position: usize) -> Self {
        Self { pc, addr, lane: position }
    }
}

/// A 3-dimensional table `W[context][row][lane]` of signed 8-bit weights,
/// stored in a single contiguous buffer.
///
/// The context is selected by `pc % contexts`, the row by `addr % rows`.
/// Each weight is an independent saturating counter in
/// `[-WEIGHT_LIMIT, WEIGHT_LIMIT]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaturatingWeightTable {
    contexts: usize,
    rows: usize,
    lanes: usize,
    data: Vec<i8>,
}
impl SaturatingWeightTable {
    /// Create a zeroed table for `history` history positions plus the bias.
    pub fn new(contexts: usize, rows: usize, history: usize)
        -> Result<Self, ConfigError>
    {
        if contexts == 0 { return Err(ConfigError::ZeroContexts); }
        if rows == 0 { return Err(ConfigError::ZeroRows); }
        if history == 0 { return Err(ConfigError::ZeroHistory); }
        let lanes = history + 1;
        Ok(Self {
            contexts,
            rows,
            lanes,
            data: vec![0; contexts * rows * lanes],
        })
    }

    pub fn contexts(&self) -> usize { self.contexts }
    pub fn rows(&self) -> usize { self.rows }
    pub fn lanes(&self) -> usize { self.lanes }

    /// Read `W[context][row][lane]` directly.
    pub fn get(&self, context: usize, row: usize, lane: usize) -> i8 {
        self.data[self.offset(context, row, lane)]
    }

    /// Read the weight addressed by some slot.
    pub fn weight(&self, slot: WeightSlot) -> i8 {
        *self.get_entry(self.get_index(slot))
    }

    /// Move a weight one step toward agreement (+1) or disagreement (-1)
    /// with the resolved outcome, saturating at both ends.
    pub fn train(&mut self, slot: WeightSlot, agree: bool) {
        let idx = self.get_index(slot);
        let w = self.get_entry_mut(idx);
        *w = if agree {
            w.saturating_add(1).min(WEIGHT_LIMIT)
        } else {
            w.saturating_sub(1).max(-WEIGHT_LIMIT)
        };
    }

    /// All weights belonging to one context, row-major.
    pub fn context_slab(&self, context: usize) -> &[i8] {
        let len = self.rows * self.lanes;
        let start = context * len;
        &self.data[start..start + len]
    }

    pub fn storage_bits(&self) -> usize {
        self.data.len() * i8::BITS as usize
    }

    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    fn offset(&self, context: usize, row: usize, lane: usize) -> usize {
        assert!(context < self.contexts && row < self.rows && lane < self.lanes,
            "weight index ({}, {}, {}) out of bounds", context, row, lane);
        (context * self.rows + row) * self.lanes + lane
    }
}

impl PredictorTable for SaturatingWeightTable {
    type Input<'a> = WeightSlot;
    type Index = usize;
    type Entry = i8;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, slot: WeightSlot) -> usize {
        self.offset(slot.pc % self.contexts, slot.addr % self.rows, slot.lane)
    }

    fn get_entry(&self, idx: usize) -> &i8 {
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut i8 {
        &mut self.data[idx]
    }
}
