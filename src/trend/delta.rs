use super::{HistoryWindow, TrendPolicy, TrendSignal};

/// Compares the newest extent with the one before it.
///
/// Reacts within a single tick and is the most sensitive to noise.
#[derive(Debug, Clone)]
pub struct DeltaPolicy {
    threshold: f64,
}

impl DeltaPolicy {
    /// Create a delta policy with absolute change threshold `threshold`
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
}

impl TrendPolicy for DeltaPolicy {
    fn estimate(&self, window: &HistoryWindow) -> TrendSignal {
        let (Some(newest), Some(previous)) = (window.back(0), window.back(1)) else {
            return TrendSignal::Flat;
        };

        let diff = newest - previous;
        if diff > self.threshold {
            TrendSignal::Increasing
        } else if diff < -self.threshold {
            TrendSignal::Decreasing
        } else {
            TrendSignal::Flat
        }
    }

    fn warm_up(&self, capacity: usize) -> usize {
        capacity
    }

    fn name(&self) -> &str {
        "DeltaPolicy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(values: &[f64]) -> HistoryWindow {
        let mut window = HistoryWindow::new(values.len().max(1));
        for &v in values {
            window.push(v);
        }
        window
    }

    #[test]
    fn test_delta_directions() {
        let policy = DeltaPolicy::new(2000.0);

        assert_eq!(policy.estimate(&window_of(&[1000.0, 4000.0])), TrendSignal::Increasing);
        assert_eq!(policy.estimate(&window_of(&[4000.0, 1000.0])), TrendSignal::Decreasing);
        assert_eq!(policy.estimate(&window_of(&[1000.0, 2500.0])), TrendSignal::Flat);
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = DeltaPolicy::new(100.0);
        assert_eq!(policy.estimate(&window_of(&[0.0, 100.0])), TrendSignal::Flat);
        assert_eq!(policy.estimate(&window_of(&[100.0, 0.0])), TrendSignal::Flat);
        assert_eq!(policy.estimate(&window_of(&[0.0, 100.5])), TrendSignal::Increasing);
    }

    #[test]
    fn test_detection_lost_reads_as_drop() {
        // A region that vanishes (extent 0) is a legitimate large decrease
        let policy = DeltaPolicy::new(2000.0);
        assert_eq!(policy.estimate(&window_of(&[9000.0, 0.0])), TrendSignal::Decreasing);
    }

    #[test]
    fn test_single_sample_is_flat() {
        let policy = DeltaPolicy::new(0.0);
        assert_eq!(policy.estimate(&window_of(&[5.0])), TrendSignal::Flat);
    }

    #[test]
    #[should_panic(expected = "Threshold must be non-negative")]
    fn test_negative_threshold() {
        let _ = DeltaPolicy::new(-1.0);
    }
}
