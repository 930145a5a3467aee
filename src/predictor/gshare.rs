//! The "gshare" global-history predictor.

use log::debug;
use serde::{ Deserialize, Serialize };

use crate::branch::{ BranchRecord, Outcome };
use crate::error::{ ConfigError, PredictorError };
use crate::history::GlobalHistoryRegister;
use crate::predictor::*;

/// Largest supported table (2^30 counters).
pub const MAX_TABLE_BITS: usize = 30;

/// Configuration for a [`GsharePredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GshareConfig {
    /// log2 of the number of counters
    pub table_bits: usize,

    /// Number of outcome history bits hashed into the index
    pub history_length: usize,
}
impl GshareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_bits == 0 || self.table_bits > MAX_TABLE_BITS {
            return Err(ConfigError::TableBits {
                got: self.table_bits, max: MAX_TABLE_BITS
            });
        }
        if self.history_length == 0 || self.history_length > self.table_bits {
            return Err(ConfigError::HistoryLength {
                got: self.history_length, table_bits: self.table_bits
            });
        }
        Ok(())
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let ctr = SaturatingCounterConfig::TWO_BIT.storage_bits();
        (ctr << self.table_bits) + self.history_length
    }

    /// Use this configuration to create a new [`GsharePredictor`].
    pub fn build(self) -> Result<GsharePredictor, ConfigError> {
        self.validate()?;
        let ghr = GlobalHistoryRegister::new(self.history_length)?;
        let pht = PatternHistoryTable::new(self.table_bits,
            self.history_length, SaturatingCounterConfig::TWO_BIT);
        debug!("gshare: {} counters, {} history bits",
            pht.size(), self.history_length);
        Ok(GsharePredictor {
            cfg: self,
            pht,
            ghr,
            pending: PendingBranch::default(),
        })
    }
}
impl Default for GshareConfig {
    fn default() -> Self {
        Self { table_bits: 15, history_length: 15 }
    }
}

/// A table of 2-bit counters indexed by global history XOR'ed with the
/// program counter.
///
/// See "Combining Branch Predictors" (McFarling, 1993).
pub struct GsharePredictor {
    cfg: GshareConfig,
    pht: PatternHistoryTable,
    ghr: GlobalHistoryRegister,
    pending: PendingBranch,
}
impl GsharePredictor {
    pub fn new(cfg: GshareConfig) -> Result<Self, ConfigError> {
        cfg.build()
    }

    pub fn config(&self) -> &GshareConfig { &self.cfg }
    pub fn table(&self) -> &PatternHistoryTable { &self.pht }
    pub fn history(&self) -> &GlobalHistoryRegister { &self.ghr }
}

impl BranchPredictor for GsharePredictor {
    fn name(&self) -> &'static str { "GsharePredictor" }

    fn predict(&mut self, branch: &BranchRecord)
        -> Result<Prediction, PredictorError>
    {
        self.pending.capture(branch)?;
        if branch.is_unconditional() {
            return Ok(Prediction::unconditional(branch.pc));
        }
        let index = self.pht.get_index((branch.pc, &self.ghr));
        Ok(Prediction {
            pc: branch.pc,
            outcome: self.pht.get_entry(index).predict(),
            target: 0,
            kind: PredictionKind::Gshare { index },
        })
    }

    fn update(&mut self, prediction: Prediction, outcome: Outcome,
        _target: usize) -> Result<(), PredictorError>
    {
        let branch = self.pending.check(&prediction)?;
        let index = match prediction.kind {
            PredictionKind::Unconditional => {
                self.pending.clear();
                return Ok(());
            },
            PredictionKind::Gshare { index } => index,
            PredictionKind::Piecewise { .. } => {
                return Err(PredictorError::MismatchedPrediction {
                    pc: branch.pc
                });
            },
        };
        self.pending.clear();

        self.pht.get_entry_mut(index).update(outcome);
        self.ghr.push(outcome);
        Ok(())
    }

    fn reset(&mut self) {
        self.pht.reset();
        self.ghr.reset();
        self.pending.clear();
    }

    fn storage_bits(&self) -> usize {
        self.pht.storage_bits() + self.ghr.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn step(p: &mut GsharePredictor, b: &BranchRecord) -> Prediction {
        let pred = p.predict(b).unwrap();
        p.update(pred, b.outcome(), b.tgt).unwrap();
        pred
    }

    #[rstest]
    #[case(0, 0)]
    #[case(31, 4)]
    #[case(8, 0)]
    #[case(8, 9)]
    fn out_of_range_widths_are_rejected(#[case] table_bits: usize,
        #[case] history_length: usize)
    {
        let cfg = GshareConfig { table_bits, history_length };
        assert!(cfg.build().is_err());
    }

    #[test]
    fn default_matches_the_reference_sizes() {
        let p = GshareConfig::default().build().unwrap();
        assert_eq!(p.table().size(), 1 << 15);
        assert_eq!(p.storage_bits(), (2 << 15) + 15);
        assert_eq!(p.storage_bits(), p.config().storage_bits());
    }

    #[test]
    fn warms_up_after_repeated_taken_outcomes() {
        let mut p = GshareConfig { table_bits: 4, history_length: 2 }
            .build().unwrap();
        let b = BranchRecord::conditional(0x5, 0x40, Outcome::T);

        // History settles at 0b11 after two branches, so every later
        // prediction uses index (0b11 << 2) ^ 0x5.
        let preds: Vec<Outcome> = (0..7).map(|_| step(&mut p, &b).outcome)
            .collect();
        use Outcome::*;
        assert_eq!(preds, vec![N, N, N, N, T, T, T]);
        assert_eq!(p.table().counter(0b1100 ^ 0x5).value(), 3);
        assert_eq!(p.table().counter(0x5).value(), 1);
        assert_eq!(p.table().counter(0b0100 ^ 0x5).value(), 1);
    }

    #[test]
    fn unconditional_branches_are_taken_and_ignored() {
        let mut p = GshareConfig { table_bits: 4, history_length: 4 }
            .build().unwrap();
        let j = BranchRecord::jump(0x10, 0x80);
        for _ in 0..4 {
            let pred = p.predict(&j).unwrap();
            assert!(pred.is_taken());
            p.update(pred, Outcome::N, 0x80).unwrap();
        }
        assert!(p.history().data().not_any());
        assert!((0..16).all(|i| p.table().counter(i).value() == 0));
    }

    #[test]
    fn rejects_foreign_predictions() {
        let mut p = GshareConfig::default().build().unwrap();
        let b = BranchRecord::conditional(0x10, 0x80, Outcome::T);
        let pred = p.predict(&b).unwrap();
        let foreign = Prediction {
            kind: PredictionKind::Piecewise { score: 1 }, ..pred
        };
        assert_eq!(p.update(foreign, Outcome::T, 0),
            Err(PredictorError::MismatchedPrediction { pc: 0x10 }));
        p.update(pred, Outcome::T, 0).unwrap();
    }
}
