//! Piecewise-linear branch prediction.

use log::{ debug, trace };
use serde::{ Deserialize, Serialize };

use crate::branch::{ BranchRecord, Outcome };
use crate::error::{ ConfigError, PredictorError };
use crate::history::*;
use crate::predictor::*;

// Training threshold coefficients for piecewise-linear prediction.
const THETA_COEFF: f64 = 2.14;
const THETA_BIAS: f64 = 20.58;

/// Configuration for a [`PiecewisePredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiecewiseConfig {
    /// Number of address contexts (N); the predicted branch's program
    /// counter selects a context modulo this value
    pub contexts: usize,

    /// Number of rows per context (M); each address in the address history
    /// selects a row modulo this value
    pub rows: usize,

    /// History length (H), in branches
    pub history: usize,
}
impl PiecewiseConfig {
    /// Many address contexts with a short row dimension.
    pub fn cbp2() -> Self {
        Self { contexts: 32, rows: 8, history: 30 }
    }

    /// A single context indexed only by path history.
    pub fn global() -> Self {
        Self { contexts: 1, rows: 256, history: 32 }
    }

    /// The training threshold for this history length.
    pub fn theta(&self) -> f64 {
        THETA_COEFF * (self.history + 1) as f64 + THETA_BIAS
    }

    /// Get the [approximate] number of storage bits: the weight table, the
    /// address history (32-bit addresses) and the outcome history.
    pub fn storage_bits(&self) -> usize {
        let weights = 8 * self.contexts * self.rows * (self.history + 1);
        let addrs = 32 * self.history;
        weights + addrs + self.history
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contexts == 0 { return Err(ConfigError::ZeroContexts); }
        if self.rows == 0 { return Err(ConfigError::ZeroRows); }
        if self.history == 0 { return Err(ConfigError::ZeroHistory); }
        Ok(())
    }

    /// Use this configuration to create a new [`PiecewisePredictor`].
    pub fn build(self) -> Result<PiecewisePredictor, ConfigError> {
        self.validate()?;
        let weights = SaturatingWeightTable::new(
            self.contexts, self.rows, self.history
        )?;
        let ga = CircularHistoryBuffer::new(self.history)?;
        let ghr = GlobalHistoryRegister::new(self.history)?;
        debug!("piecewise: N={} M={} H={} theta={:.2} ({} bits)",
            self.contexts, self.rows, self.history, self.theta(),
            self.storage_bits());
        Ok(PiecewisePredictor {
            cfg: self,
            theta: self.theta(),
            weights,
            ga,
            ghr,
            pending: PendingBranch::default(),
        })
    }
}
impl Default for PiecewiseConfig {
    fn default() -> Self { Self::cbp2() }
}

/// Piecewise-linear branch predictor.
///
/// Each conditional branch is predicted by summing one weight per position
/// in the path history. The weight for position `i` is selected by the
/// predicted branch, by the address of the branch seen `i` branches ago,
/// and by `i` itself. It is added when that older branch was taken and
/// subtracted otherwise. A per-context bias weight is always included.
///
/// See "Piecewise Linear Branch Prediction" (Jiménez, 2005).
pub struct PiecewisePredictor {
    cfg: PiecewiseConfig,

    /// Training threshold
    theta: f64,

    /// Weights `W[context][row][lane]`
    weights: SaturatingWeightTable,

    /// Addresses of recent conditional branches
    ga: CircularHistoryBuffer,

    /// Outcomes of recent conditional branches
    ghr: GlobalHistoryRegister,

    pending: PendingBranch,
}
impl PiecewisePredictor {
    pub fn new(cfg: PiecewiseConfig) -> Result<Self, ConfigError> {
        cfg.build()
    }

    pub fn config(&self) -> &PiecewiseConfig { &self.cfg }
    pub fn theta(&self) -> f64 { self.theta }
    pub fn weights(&self) -> &SaturatingWeightTable { &self.weights }
    pub fn address_history(&self) -> &CircularHistoryBuffer { &self.ga }
    pub fn outcome_history(&self) -> &GlobalHistoryRegister { &self.ghr }

    /// Compute the perceptron output for a branch at `pc`.
    /// The sum only covers the history collected so far.
    fn output(&self, pc: usize) -> i32 {
        let bias = self.weights.weight(WeightSlot::bias(pc)) as i32;
        self.ga.iter().enumerate().fold(bias, |sum, (i, addr)| {
            let w = self.weights.weight(WeightSlot::history(pc, addr, i)) as i32;
            sum + self.ghr.outcome(i).sign() * w
        })
    }

    /// Adjust the weights for a branch at `pc`.
    ///
    /// Training occurs after a misprediction, or when the magnitude of the
    /// output is below the threshold. The bias moves toward the outcome;
    /// each history weight moves up when its history bit agrees with the
    /// outcome and down otherwise.
    fn train(&mut self, pc: usize, score: i32, predicted: Outcome,
        outcome: Outcome)
    {
        let miss = (predicted != outcome);
        let below_threshold = ((score.unsigned_abs() as f64) < self.theta);
        if !(miss || below_threshold) {
            trace!("{:#x}: confident ({}), not training", pc, score);
            return;
        }
        trace!("{:#x}: training (score={}, miss={})", pc, score, miss);

        self.weights.train(WeightSlot::bias(pc), outcome == Outcome::T);
        for (i, addr) in self.ga.iter().enumerate() {
            let agree = (self.ghr.outcome(i) == outcome);
            self.weights.train(WeightSlot::history(pc, addr, i), agree);
        }
    }
}

impl BranchPredictor for PiecewisePredictor {
    fn name(&self) -> &'static str { "PiecewisePredictor" }

    fn predict(&mut self, branch: &BranchRecord)
        -> Result<Prediction, PredictorError>
    {
        self.pending.capture(branch)?;
        if branch.is_unconditional() {
            return Ok(Prediction::unconditional(branch.pc));
        }
        let score = self.output(branch.pc);
        Ok(Prediction {
            pc: branch.pc,
            outcome: Outcome::from(score >= 0),
            target: 0,
            kind: PredictionKind::Piecewise { score },
        })
    }

    fn update(&mut self, prediction: Prediction, outcome: Outcome,
        _target: usize) -> Result<(), PredictorError>
    {
        let branch = self.pending.check(&prediction)?;
        let score = match prediction.kind {
            PredictionKind::Unconditional => {
                self.pending.clear();
                return Ok(());
            },
            PredictionKind::Piecewise { score } => score,
            PredictionKind::Gshare { .. } => {
                return Err(PredictorError::MismatchedPrediction {
                    pc: branch.pc
                });
            },
        };
        self.pending.clear();

        // Weights are trained against the history used for the prediction,
        // only then is this branch appended to it.
        self.train(branch.pc, score, prediction.outcome, outcome);
        self.ga.push(branch.pc);
        self.ghr.push(outcome);
        Ok(())
    }

    fn reset(&mut self) {
        self.weights.reset();
        self.ga.clear();
        self.ghr.reset();
        self.pending.clear();
    }

    fn storage_bits(&self) -> usize { self.cfg.storage_bits() }
}
