//! Fixed-capacity ring buffer of timestamps

/// Circular buffer with a write cursor and a fill flag
///
/// The ring becomes valid the first time the cursor wraps and stays valid
/// until [`TimestampRing::clear`] is called.
#[derive(Debug, Clone)]
pub struct TimestampRing<const N: usize> {
    slots: [f64; N],
    cursor: usize,
    filled: bool,
}

impl<const N: usize> Default for TimestampRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimestampRing<N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self {
            slots: [0.0; N],
            cursor: 0,
            filled: false,
        }
    }

    /// Write a value at the cursor and advance, wrapping at capacity
    pub fn push(&mut self, value: f64) {
        self.slots[self.cursor] = value;
        self.cursor += 1;
        if self.cursor == N {
            self.cursor = 0;
            self.filled = true;
        }
    }

    /// Whether every slot has been written since the last clear
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Number of values written since the last clear, capped at capacity
    pub fn len(&self) -> usize {
        if self.filled {
            N
        } else {
            self.cursor
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset to empty; previous contents become unreachable
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.filled = false;
    }

    /// Slots in storage order (not insertion order once wrapped)
    pub fn slots(&self) -> &[f64; N] {
        &self.slots
    }

    /// Adjacent slot pairs in storage order, including the pair from the
    /// last slot back to the first
    pub fn cyclic_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..N).map(move |i| (self.slots[i], self.slots[(i + 1) % N]))
    }
}
