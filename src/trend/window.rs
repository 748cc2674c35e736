use std::collections::VecDeque;

/// Fixed-capacity history of the most recent extents, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl HistoryWindow {
    /// Create an empty window holding at most `capacity` extents
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Window size must be greater than 0");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an extent, returning the evicted oldest one when the window was full
    pub fn push(&mut self, extent: f64) -> Option<f64> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(extent);
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the window holds `capacity` extents
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Extents oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.samples.iter().copied()
    }

    /// The most recent `n` extents, oldest first (fewer if the window is shorter)
    pub fn tail(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().skip(self.samples.len().saturating_sub(n)).copied()
    }

    #[must_use]
    pub fn newest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    #[must_use]
    pub fn oldest(&self) -> Option<f64> {
        self.samples.front().copied()
    }

    /// Extent `offset` steps before the newest one (`0` is the newest)
    #[must_use]
    pub fn back(&self, offset: usize) -> Option<f64> {
        let len = self.samples.len();
        if offset >= len {
            return None;
        }
        self.samples.get(len - 1 - offset).copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
