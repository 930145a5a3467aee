//! Pattern history table (PHT) indexed by hashed global history.

use crate::history::GlobalHistoryRegister;
use crate::predictor::*;

/// A table of [SaturatingCounter] indexed by XOR-ing global history with
/// the low bits of the program counter (the "gshare" hash).
#[derive(Clone, Debug)]
pub struct PatternHistoryTable {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,

    /// log2 of the number of entries
    table_bits: usize,

    /// Number of history bits folded into the index
    history_bits: usize,
}
impl PatternHistoryTable {
    /// Create a table with `1 << table_bits` entries.
    /// The caller guarantees `history_bits <= table_bits`.
    pub fn new(table_bits: usize, history_bits: usize,
        cfg: SaturatingCounterConfig) -> Self
    {
        debug_assert!(history_bits <= table_bits);
        Self {
            cfg,
            data: vec![cfg.build(); 1 << table_bits],
            table_bits,
            history_bits,
        }
    }

    pub fn storage_bits(&self) -> usize {
        self.cfg.storage_bits() * self.size()
    }

    /// Returns the counter at some index.
    pub fn counter(&self, idx: usize) -> &SaturatingCounter {
        self.get_entry(idx)
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| c.reset());
    }
}

impl PredictorTable for PatternHistoryTable {
    type Input<'a> = (usize, &'a GlobalHistoryRegister);
    type Index = usize;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, input: Self::Input<'_>) -> usize {
        let (pc, ghr) = input;
        let hist = ghr.low_bits(self.history_bits);
        let idx = (hist << (self.table_bits - self.history_bits)) ^ pc;
        idx & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        let index = idx & self.index_mask();
        &self.data[index]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::Outcome;

    #[test]
    fn index_xors_shifted_history_with_pc() {
        let pht = PatternHistoryTable::new(4, 2,
            SaturatingCounterConfig::TWO_BIT);
        let mut ghr = GlobalHistoryRegister::new(2).unwrap();
        assert_eq!(pht.get_index((0x35, &ghr)), 0x5);

        ghr.push(Outcome::T);
        assert_eq!(pht.get_index((0x35, &ghr)), 0b0100 ^ 0x5);

        ghr.push(Outcome::T);
        assert_eq!(pht.get_index((0x35, &ghr)), 0b1100 ^ 0x5);
    }

    #[test]
    fn storage_is_two_bits_per_entry() {
        let pht = PatternHistoryTable::new(15, 15,
            SaturatingCounterConfig::TWO_BIT);
        assert_eq!(pht.size(), 1 << 15);
        assert_eq!(pht.storage_bits(), 2 << 15);
    }
}
