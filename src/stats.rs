//! Helpers for collecting statistics.

use std::collections::*;
use bitvec::prelude::*;
use itertools::*;

use crate::branch::*;

/// Container for recording simple statistics while evaluating some model.
#[derive(Debug, Default)]
pub struct TraceStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<usize, BranchData>,

    /// Number of correct predictions
    pub global_hits: usize,

    /// Number of times any conditional branch instruction was executed
    pub global_brns: usize,
}
impl TraceStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        if self.global_brns == 0 {
            return 0.0;
        }
        self.global_hits as f64 / self.global_brns as f64
    }

    /// Return the global hit count.
    pub fn global_hits(&self) -> usize { self.global_hits }

    /// Return the global miss count.
    pub fn global_miss(&self) -> usize { self.global_brns - self.global_hits }

    /// Return the total branch count.
    pub fn global_brns(&self) -> usize { self.global_brns }

    /// Mispredictions per thousand conditional branches.
    pub fn mpkb(&self) -> f64 {
        if self.global_brns == 0 {
            return 0.0;
        }
        1000.0 * self.global_miss() as f64 / self.global_brns as f64
    }

    /// Record a prediction for some resolved branch.
    pub fn update(&mut self, record: &BranchRecord, predicted: Outcome) {
        let outcome = record.outcome();
        let hit = (predicted == outcome);
        self.global_brns += 1;
        if hit { self.global_hits += 1; }

        let data = self.get_mut(record.pc);
        data.occ += 1;
        data.pat.push(outcome.into());
        if hit { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: usize) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: usize) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of branches that are always taken
    pub fn num_always_taken(&self) -> usize {
        self.data.values().filter(|d| d.is_always_taken()).count()
    }

    /// Returns the number of branches that are never taken
    pub fn num_never_taken(&self) -> usize {
        self.data.values().filter(|d| d.is_never_taken()).count()
    }

    /// Returns the `n` most frequently executed branches.
    pub fn get_common_branches(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data.iter()
            .sorted_by(|x, y| y.1.occ.cmp(&x.1.occ).then(x.0.cmp(y.0)))
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }

    /// Returns up to `n` of the branches with the lowest hit rate among
    /// those executed at least `min_occ` times.
    pub fn get_low_rate_branches(&self, min_occ: usize, n: usize)
        -> Vec<(usize, &BranchData)>
    {
        self.data.iter()
            .filter(|(_, s)| s.occ >= min_occ)
            .sorted_by(|x, y| {
                x.1.hit_rate().total_cmp(&y.1.hit_rate())
                    .then(y.1.occ.cmp(&x.1.occ))
            })
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Debug, Default)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 {
            return 0.0;
        }
        self.hits as f64 / self.occ as f64
    }

    pub fn is_always_taken(&self) -> bool {
        self.pat.count_ones() == self.pat.len()
    }

    pub fn is_never_taken(&self) -> bool {
        self.pat.count_zeros() == self.pat.len()
    }

    pub fn times_taken(&self) -> usize {
        self.pat.count_ones()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_hits_per_branch() {
        let mut stat = TraceStats::new();
        let a = BranchRecord::conditional(0x10, 0x20, Outcome::T);
        let b = BranchRecord::conditional(0x30, 0x40, Outcome::N);
        stat.update(&a, Outcome::T);
        stat.update(&a, Outcome::N);
        stat.update(&b, Outcome::N);
        stat.update(&b, Outcome::N);
        stat.update(&b, Outcome::N);

        assert_eq!(stat.global_brns(), 5);
        assert_eq!(stat.global_hits(), 4);
        assert_eq!(stat.global_miss(), 1);
        assert!((stat.hit_rate() - 0.8).abs() < 1e-9);
        assert!((stat.mpkb() - 200.0).abs() < 1e-9);

        assert_eq!(stat.num_unique_branches(), 2);
        assert_eq!(stat.num_always_taken(), 1);
        assert_eq!(stat.num_never_taken(), 1);
        assert_eq!(stat.get(0x10).unwrap().times_taken(), 2);

        let common: Vec<usize> = stat.get_common_branches(1).iter()
            .map(|(pc, _)| *pc).collect();
        assert_eq!(common, vec![0x30]);

        let low = stat.get_low_rate_branches(2, 4);
        assert_eq!(low[0].0, 0x10);
        assert!((low[0].1.hit_rate() - 0.5).abs() < 1e-9);
        assert!(stat.get_low_rate_branches(3, 4).iter().all(|(pc, _)| *pc == 0x30));
    }

    #[test]
    fn empty_stats_have_zero_rates() {
        let stat = TraceStats::new();
        assert_eq!(stat.hit_rate(), 0.0);
        assert_eq!(stat.mpkb(), 0.0);
    }
}
