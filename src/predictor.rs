//! Implementations of different branch predictors.

pub mod table;
pub mod counter;
pub mod pht;
pub mod weights;
pub mod piecewise;
pub mod gshare;

pub use table::*;
pub use counter::*;
pub use pht::*;
pub use weights::*;
pub use piecewise::*;
pub use gshare::*;

use log::debug;

use crate::branch::{ BranchRecord, Outcome };
use crate::error::PredictorError;

/// Predictor-specific payload carried from `predict` to `update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionKind {
    /// The branch was unconditional and no predictor state was consulted.
    Unconditional,

    /// A piecewise-linear prediction with its raw perceptron output.
    Piecewise { score: i32 },

    /// A gshare prediction from the counter at some table index.
    Gshare { index: usize },
}

/// The result of [`BranchPredictor::predict`].
///
/// This must be passed back to [`BranchPredictor::update`] once the branch
/// has been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prediction {
    /// Program counter of the predicted branch
    pub pc: usize,

    /// The predicted direction
    pub outcome: Outcome,

    /// The predicted target (target prediction is not implemented, this is
    /// always zero)
    pub target: usize,

    pub kind: PredictionKind,
}
impl Prediction {
    /// An unconditional branch is always predicted 'taken'.
    pub fn unconditional(pc: usize) -> Self {
        Self { pc, outcome: Outcome::T, target: 0, kind: PredictionKind::Unconditional }
    }

    pub fn is_taken(&self) -> bool { self.outcome == Outcome::T }

    /// The raw perceptron output, if this prediction came from a
    /// perceptron-style predictor.
    pub fn training_score(&self) -> Option<i32> {
        match self.kind {
            PredictionKind::Piecewise { score } => Some(score),
            _ => None,
        }
    }
}

/// Interface to a predictor that is consulted for each branch and then
/// updated with the resolved outcome, strictly in program order.
pub trait BranchPredictor {
    fn name(&self) -> &'static str;

    /// Predict the direction of a branch.
    ///
    /// Fails if the previous prediction has not been resolved with
    /// [`BranchPredictor::update`].
    fn predict(&mut self, branch: &BranchRecord)
        -> Result<Prediction, PredictorError>;

    /// Resolve the pending prediction with the correct outcome and target.
    ///
    /// Fails if there is no pending prediction, or if `prediction` was not
    /// produced for the pending branch.
    fn update(&mut self, prediction: Prediction, outcome: Outcome,
        target: usize) -> Result<(), PredictorError>;

    /// Return to the post-construction state, discarding any pending
    /// prediction.
    fn reset(&mut self);

    /// The [approximate] number of storage bits used by the predictor.
    fn storage_bits(&self) -> usize;
}

/// The branch captured by `predict`, held until the matching `update`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingBranch(Option<BranchRecord>);
impl PendingBranch {
    /// Capture a branch, rejecting a second `predict` before `update`.
    pub fn capture(&mut self, branch: &BranchRecord)
        -> Result<(), PredictorError>
    {
        if let Some(pending) = self.0 {
            debug!("predict({:#x}) rejected: {:#x} still pending",
                branch.pc, pending.pc);
            return Err(PredictorError::PredictPending { pc: pending.pc });
        }
        self.0 = Some(*branch);
        Ok(())
    }

    /// Return the captured branch if `prediction` was made for it.
    /// The branch stays captured until [`PendingBranch::clear`].
    pub fn check(&self, prediction: &Prediction)
        -> Result<BranchRecord, PredictorError>
    {
        let branch = self.0.ok_or_else(|| {
            debug!("update({:#x}) rejected: nothing pending", prediction.pc);
            PredictorError::UpdateWithoutPredict
        })?;
        let unconditional = (prediction.kind == PredictionKind::Unconditional);
        if prediction.pc != branch.pc
            || unconditional != branch.is_unconditional()
        {
            debug!("update rejected: {:?} does not match pending {:#x}",
                prediction, branch.pc);
            return Err(PredictorError::MismatchedPrediction { pc: branch.pc });
        }
        Ok(branch)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pending_branch_enforces_alternation() {
        let mut p = PendingBranch::default();
        let b = BranchRecord::conditional(0x40, 0x80, Outcome::T);
        let pred = Prediction {
            pc: 0x40, outcome: Outcome::N, target: 0,
            kind: PredictionKind::Piecewise { score: -3 },
        };

        assert_eq!(p.check(&pred), Err(PredictorError::UpdateWithoutPredict));
        p.capture(&b).unwrap();
        assert_eq!(p.capture(&b),
            Err(PredictorError::PredictPending { pc: 0x40 }));
        assert_eq!(p.check(&pred), Ok(b));
        assert_eq!(p.check(&Prediction::unconditional(0x40)),
            Err(PredictorError::MismatchedPrediction { pc: 0x40 }));
        p.clear();
        assert!(!p.is_pending());
    }

    #[test]
    fn training_score_only_for_perceptron_predictions() {
        let pred = Prediction {
            pc: 0, outcome: Outcome::T, target: 0,
            kind: PredictionKind::Piecewise { score: 7 },
        };
        assert_eq!(pred.training_score(), Some(7));
        assert_eq!(Prediction::unconditional(0).training_score(), None);
        assert!(Prediction::unconditional(0).is_taken());
    }
}
