//! Generating synthetic traces from simple branch behaviors.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::branch::*;

/// A pre-determined pattern of outcomes associated with a conditional branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary repeating pattern of outcomes.
    Pattern(Vec<Outcome>),

    /// A branch taken with some probability (in units of 1/1000).
    Random { taken_per_mille: u16 },
}
impl BranchPattern {
    /// Given the number of previous executions, generate an outcome.
    fn outcome(&self, ctr: usize, rng: &mut StdRng) -> Outcome {
        match self {
            Self::AlwaysTaken => Outcome::T,
            Self::NeverTaken => Outcome::N,
            Self::TakenPeriodic(p) => {
                let p = (*p).max(1);
                Outcome::from(ctr % p == p - 1)
            },
            Self::NotTakenPeriodic(p) => {
                let p = (*p).max(1);
                Outcome::from(ctr % p != p - 1)
            },
            Self::Pattern(p) if p.is_empty() => Outcome::N,
            Self::Pattern(p) => p[ctr % p.len()],
            Self::Random { taken_per_mille } => {
                Outcome::from(rng.gen_range(0..1000) < *taken_per_mille)
            },
        }
    }
}

#[derive(Clone, Debug)]
struct Site {
    pc: usize,
    tgt: usize,
    /// [None] for an unconditional jump
    pattern: Option<BranchPattern>,
    ctr: usize,
}

/// A loop body of branch sites executed repeatedly, in order.
#[derive(Clone, Debug)]
pub struct SyntheticTrace {
    sites: Vec<Site>,
    rng: StdRng,
}
impl SyntheticTrace {
    pub fn new(seed: u64) -> Self {
        Self { sites: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    /// Add a conditional branch to the loop body.
    pub fn branch(mut self, pc: usize, tgt: usize, pattern: BranchPattern)
        -> Self
    {
        self.sites.push(Site { pc, tgt, pattern: Some(pattern), ctr: 0 });
        self
    }

    /// Add an unconditional jump to the loop body.
    pub fn jump(mut self, pc: usize, tgt: usize) -> Self {
        self.sites.push(Site { pc, tgt, pattern: None, ctr: 0 });
        self
    }

    /// A loop body of `num_branches` conditional branches with randomly
    /// chosen addresses and behaviors, closed by a backwards jump.
    pub fn mixed(num_branches: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut res = Self::new(seed);
        let base = 0x0040_0000;
        let mut pc = base;
        for _ in 0..num_branches {
            pc += 4 * rng.gen_range(1..16);
            let pattern = match rng.gen_range(0..6) {
                0 => BranchPattern::AlwaysTaken,
                1 => BranchPattern::NeverTaken,
                2 => BranchPattern::TakenPeriodic(rng.gen_range(2..8)),
                3 => BranchPattern::NotTakenPeriodic(rng.gen_range(2..8)),
                4 => {
                    let len = rng.gen_range(2..6);
                    BranchPattern::Pattern(
                        (0..len).map(|_| Outcome::from(rng.gen::<bool>()))
                            .collect()
                    )
                },
                _ => BranchPattern::Random {
                    taken_per_mille: rng.gen_range(100..900)
                },
            };
            res = res.branch(pc, pc + 0x40, pattern);
        }
        res.jump(pc + 4, base)
    }

    /// Run the loop body until `len` records have been produced.
    pub fn generate(&mut self, len: usize) -> Vec<BranchRecord> {
        let mut res = Vec::with_capacity(len);
        if self.sites.is_empty() {
            return res;
        }
        let num_sites = self.sites.len();
        for idx in 0..len {
            let site = &mut self.sites[idx % num_sites];
            let record = match &site.pattern {
                Some(pat) => {
                    let outcome = pat.outcome(site.ctr, &mut self.rng);
                    BranchRecord::conditional(site.pc, site.tgt, outcome)
                },
                None => BranchRecord::jump(site.pc, site.tgt),
            };
            site.ctr += 1;
            res.push(record);
        }
        res
    }
}
