//! History of recently observed branch addresses.

use std::collections::VecDeque;
use crate::error::ConfigError;

/// A fixed-capacity ring buffer of branch addresses.
///
/// Index 0 is the most recently pushed address and index `size() - 1` is the
/// oldest one still retained. Pushing into a full buffer evicts the oldest
/// entry. Reads past the current occupancy return the sentinel `0` so that
/// callers summing over a partially-filled history don't need to branch.
#[derive(Clone, Debug)]
pub struct CircularHistoryBuffer {
    /// Oldest entry at the front, newest at the back
    data: VecDeque<usize>,
    capacity: usize,
}
impl CircularHistoryBuffer {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of addresses currently retained.
    pub fn size(&self) -> usize { self.data.len() }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn is_full(&self) -> bool { self.data.len() == self.capacity }

    /// Insert an address, evicting the oldest entry when full.
    pub fn push(&mut self, addr: usize) {
        if self.is_full() {
            self.pop_front();
        }
        self.data.push_back(addr);
    }

    /// Remove the oldest entry. Returns 0 if the buffer is empty.
    pub fn pop_front(&mut self) -> usize {
        self.data.pop_front().unwrap_or(0)
    }

    /// Return the address pushed `index` insertions ago.
    pub fn at(&self, index: usize) -> usize {
        if index >= self.data.len() {
            return 0;
        }
        self.data[self.data.len() - 1 - index]
    }

    /// Iterate over retained addresses, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.iter().rev().copied()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
