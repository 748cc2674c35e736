use super::{HistoryWindow, TrendPolicy, TrendSignal};
use crate::constants::{EPSILON, SPLIT_AVERAGE_SAMPLES};

/// Relative change between the averages of the older and newer pair
/// among the four most recent extents.
#[derive(Debug, Clone)]
pub struct SplitAveragePolicy {
    threshold: f64,
}

impl SplitAveragePolicy {
    /// Create a split-average policy with relative change threshold `threshold`
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is negative or not finite
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        assert!(
            threshold.is_finite() && threshold >= 0.0,
            "Threshold must be non-negative, got {}",
            threshold
        );
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Relative change of the newer pair against the older pair.
    ///
    /// `None` when fewer than four extents are available or the older
    /// average is zero (no baseline to compare against).
    #[must_use]
    pub fn ratio(window: &HistoryWindow) -> Option<f64> {
        if window.len() < SPLIT_AVERAGE_SAMPLES {
            return None;
        }

        let (Some(newest), Some(second), Some(third), Some(fourth)) =
            (window.back(0), window.back(1), window.back(2), window.back(3))
        else {
            return None;
        };
        let old_avg = (fourth + third) / 2.0;
        let new_avg = (second + newest) / 2.0;

        if old_avg.abs() <= EPSILON {
            return None;
        }

        Some((new_avg - old_avg) / old_avg)
    }
}

impl TrendPolicy for SplitAveragePolicy {
    fn estimate(&self, window: &HistoryWindow) -> TrendSignal {
        match Self::ratio(window) {
            Some(ratio) if ratio > self.threshold => TrendSignal::Increasing,
            Some(ratio) if ratio < -self.threshold => TrendSignal::Decreasing,
            _ => TrendSignal::Flat,
        }
    }

    fn warm_up(&self, _capacity: usize) -> usize {
        SPLIT_AVERAGE_SAMPLES
    }

    fn name(&self) -> &str {
        "SplitAveragePolicy"
    }
}
