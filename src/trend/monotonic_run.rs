use super::{HistoryWindow, TrendPolicy, TrendSignal};

/// Requires the whole full window to move in one direction.
///
/// Every adjacent pair must be non-decreasing (or non-increasing) and the
/// newest extent must differ strictly from the oldest. A single inversion
/// anywhere in the window invalidates the whole run for that tick.
#[derive(Debug, Clone, Default)]
pub struct MonotonicRunPolicy;

impl MonotonicRunPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TrendPolicy for MonotonicRunPolicy {
    fn estimate(&self, window: &HistoryWindow) -> TrendSignal {
        if !window.is_full() || window.len() < 2 {
            return TrendSignal::Flat;
        }

        let (Some(first), Some(last)) = (window.oldest(), window.newest()) else {
            return TrendSignal::Flat;
        };
        let non_decreasing = window.iter().zip(window.iter().skip(1)).all(|(prev, next)| next >= prev);
        let non_increasing = window.iter().zip(window.iter().skip(1)).all(|(prev, next)| next <= prev);

        if non_decreasing && last > first {
            TrendSignal::Increasing
        } else if non_increasing && last < first {
            TrendSignal::Decreasing
        } else {
            TrendSignal::Flat
        }
    }

    fn warm_up(&self, capacity: usize) -> usize {
        capacity
    }

    fn name(&self) -> &str {
        "MonotonicRunPolicy"
    }
}
