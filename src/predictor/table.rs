//! Indexed tables of predictor state.

/// A table of predictor state (counters or weights) addressed by some
/// input derived from a branch.
pub trait PredictorTable: Sized {
    /// What the table is indexed with, e.g. a pc and a history register.
    type Input<'a>;

    type Index;

    /// A single cell of state.
    type Entry;

    /// Number of cells in the table.
    fn size(&self) -> usize;

    /// Map some input onto a cell.
    fn get_index(&self, input: Self::Input<'_>) -> Self::Index;

    fn get_entry(&self, idx: Self::Index) -> &Self::Entry;

    fn get_entry_mut(&mut self, idx: Self::Index) -> &mut Self::Entry;

    /// Mask for reducing an index into a power-of-two sized table.
    fn index_mask(&self) -> usize {
        assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}
