//! Trend estimation over a bounded history of region extents.
//!
//! The estimator keeps the most recent `W` extents and asks a single
//! [`TrendPolicy`], chosen at construction, for a directional signal on
//! every tick. Until the window holds enough samples for the policy the
//! estimator reports [`TrendSignal::Flat`].

/// Bounded history of recent extents
pub mod window;

/// Newest-versus-previous absolute change
pub mod delta;

/// Relative change between averaged pairs of the four newest extents
pub mod split_average;

/// Whole-window monotonic run
pub mod monotonic_run;

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::constants::MIN_WINDOW_SIZE;
use crate::{Error, Result};

pub use window::HistoryWindow;

/// Direction of the recent extent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendSignal {
    /// Region is growing
    Increasing,
    /// Region is shrinking
    Decreasing,
    /// No directional claim
    Flat,
}

impl TrendSignal {
    /// Mirror image of the signal (`Increasing` <-> `Decreasing`)
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Increasing => Self::Decreasing,
            Self::Decreasing => Self::Increasing,
            Self::Flat => Self::Flat,
        }
    }

    #[must_use]
    pub fn is_directional(self) -> bool {
        !matches!(self, Self::Flat)
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Increasing => "Increasing",
            Self::Decreasing => "Decreasing",
            Self::Flat => "Flat",
        };
        f.write_str(name)
    }
}

impl FromStr for TrendSignal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "increasing" => Ok(Self::Increasing),
            "decreasing" => Ok(Self::Decreasing),
            "flat" => Ok(Self::Flat),
            other => Err(Error::ContractViolation(format!("Unknown trend signal: {other}"))),
        }
    }
}

/// Trait for all trend policies
pub trait TrendPolicy: Send + Sync {
    /// Derive the trend from the current window
    fn estimate(&self, window: &HistoryWindow) -> TrendSignal;

    /// Samples required before the policy may report a direction
    fn warm_up(&self, capacity: usize) -> usize;

    /// Get policy name
    fn name(&self) -> &str;
}

/// Create a trend policy from a `name[:threshold]` description
///
/// Accepted names are `delta`, `split_average` and `monotonic_run`. The
/// threshold defaults to the crate default for the policy when omitted.
///
/// # Errors
///
/// Returns `PolicyError` for unknown names, unparsable thresholds, negative
/// thresholds, or a threshold given to `monotonic_run`.
pub fn create_policy(spec: &str) -> Result<Box<dyn TrendPolicy>> {
    use crate::constants::{DEFAULT_DELTA_THRESHOLD, DEFAULT_RATIO_THRESHOLD};

    let mut parts = spec.splitn(2, ':');
    let name = parts.next().unwrap_or_default().trim().to_lowercase();
    let param = parts.next().map(str::trim);

    let threshold = |default: f64| -> Result<f64> {
        let value = match param {
            None => default,
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| Error::PolicyError(format!("Invalid threshold '{raw}' for policy {name}")))?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(Error::PolicyError(format!(
                "Threshold must be non-negative, got {value}"
            )));
        }
        Ok(value)
    };

    match name.as_str() {
        "delta" => Ok(Box::new(delta::DeltaPolicy::new(threshold(DEFAULT_DELTA_THRESHOLD)?))),
        "split_average" | "splitaverage" | "split" => Ok(Box::new(split_average::SplitAveragePolicy::new(
            threshold(DEFAULT_RATIO_THRESHOLD)?,
        ))),
        "monotonic_run" | "monotonicrun" | "monotonic" => {
            if param.is_some() {
                return Err(Error::PolicyError(
                    "Policy monotonic_run takes no threshold".to_string(),
                ));
            }
            Ok(Box::new(monotonic_run::MonotonicRunPolicy::new()))
        }
        _ => Err(Error::PolicyError(format!("Unknown trend policy: {spec}"))),
    }
}

/// Sliding-window trend estimator
pub struct TrendEstimator {
    window: HistoryWindow,
    policy: Box<dyn TrendPolicy>,
}

impl TrendEstimator {
    /// Create an estimator with a window of `window_size` extents
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the window is smaller than two samples or
    /// cannot hold the samples the policy needs.
    pub fn new(policy: Box<dyn TrendPolicy>, window_size: usize) -> Result<Self> {
        if window_size < MIN_WINDOW_SIZE {
            return Err(Error::ConfigError(format!(
                "Window size must be at least {MIN_WINDOW_SIZE}, got {window_size}"
            )));
        }
        let warm_up = policy.warm_up(window_size);
        if warm_up > window_size {
            return Err(Error::ConfigError(format!(
                "{} needs a window of at least {warm_up} samples, got {window_size}",
                policy.name()
            )));
        }

        Ok(Self {
            window: HistoryWindow::new(window_size),
            policy,
        })
    }

    /// Append an extent and return the trend of the updated window.
    ///
    /// The extent must already be validated as finite and non-negative.
    pub fn observe(&mut self, extent: f64) -> TrendSignal {
        self.window.push(extent);

        if !self.is_warm() {
            debug!(
                "Warming up: {}/{} samples",
                self.window.len(),
                self.policy.warm_up(self.window.capacity())
            );
            return TrendSignal::Flat;
        }

        self.policy.estimate(&self.window)
    }

    /// Whether the window holds enough samples for the policy
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.window.len() >= self.policy.warm_up(self.window.capacity())
    }

    #[must_use]
    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    #[must_use]
    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_policy() {
        assert!(create_policy("delta").is_ok());
        assert!(create_policy("delta:150").is_ok());
        assert!(create_policy("split_average:0.2").is_ok());
        assert!(create_policy("Monotonic").is_ok());
        assert!(create_policy("unknown").is_err());
        assert!(create_policy("delta:abc").is_err());
        assert!(create_policy("delta:-3").is_err());
        assert!(create_policy("monotonic_run:4").is_err());
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(create_policy("delta").unwrap().name(), "DeltaPolicy");
        assert_eq!(create_policy("split").unwrap().name(), "SplitAveragePolicy");
        assert_eq!(create_policy("monotonic_run").unwrap().name(), "MonotonicRunPolicy");
    }

    #[test]
    fn test_trend_signal_parse() {
        assert_eq!("Increasing".parse::<TrendSignal>().unwrap(), TrendSignal::Increasing);
        assert_eq!(" flat ".parse::<TrendSignal>().unwrap(), TrendSignal::Flat);
        assert!(matches!(
            "sideways".parse::<TrendSignal>(),
            Err(Error::ContractViolation(_))
        ));
    }

    #[test]
    fn test_estimator_warm_up() {
        let policy = create_policy("delta:0").unwrap();
        let mut estimator = TrendEstimator::new(policy, 3).unwrap();

        assert_eq!(estimator.observe(10.0), TrendSignal::Flat);
        assert_eq!(estimator.observe(20.0), TrendSignal::Flat);
        assert!(!estimator.is_warm());
        assert_eq!(estimator.observe(30.0), TrendSignal::Increasing);
        assert!(estimator.is_warm());
    }

    #[test]
    fn test_estimator_reset() {
        let policy = create_policy("delta:0").unwrap();
        let mut estimator = TrendEstimator::new(policy, 2).unwrap();
        estimator.observe(10.0);
        estimator.observe(20.0);
        estimator.reset();
        assert!(estimator.window().is_empty());
        assert_eq!(estimator.observe(30.0), TrendSignal::Flat);
    }

    #[test]
    fn test_split_average_needs_four() {
        let policy = create_policy("split_average").unwrap();
        assert!(TrendEstimator::new(policy, 3).is_err());

        let policy = create_policy("delta").unwrap();
        assert!(TrendEstimator::new(policy, 1).is_err());
    }
}
