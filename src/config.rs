//! Configuration management for the proximity monitor

use crate::classifier::ProximityClassifier;
use crate::constants::*;
use crate::debounce::{FlatPolicy, StateDebouncer};
use crate::trend::{
    delta::DeltaPolicy, monotonic_run::MonotonicRunPolicy, split_average::SplitAveragePolicy,
    TrendEstimator, TrendPolicy,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trend estimation configuration
    pub trend: TrendConfig,

    /// State confirmation configuration
    pub debounce: DebounceConfig,

    /// Motion segmentation configuration
    pub segmentation: SegmentationConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Trend policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Newest versus previous extent, absolute threshold
    Delta,
    /// Averaged older pair versus newer pair, relative threshold
    SplitAverage,
    /// Whole window monotonic
    MonotonicRun,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delta => "delta",
            Self::SplitAverage => "split_average",
            Self::MonotonicRun => "monotonic_run",
        };
        f.write_str(name)
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "delta" => Ok(Self::Delta),
            "split_average" | "splitaverage" | "split" => Ok(Self::SplitAverage),
            "monotonic_run" | "monotonicrun" | "monotonic" => Ok(Self::MonotonicRun),
            other => Err(Error::PolicyError(format!("Unknown trend policy: {other}"))),
        }
    }
}

/// Trend estimator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Which trend policy to run
    pub policy: PolicyKind,

    /// History window size (W)
    pub window_size: usize,

    /// Absolute extent change for the delta policy
    pub delta_threshold: f64,

    /// Relative change for the split-average policy
    pub ratio_threshold: f64,
}

/// Debouncer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Consecutive agreeing ticks before a direction is confirmed (CONFIRM)
    pub confirm_frames: usize,

    /// Behaviour on flat ticks while a direction is confirmed
    pub flat_policy: FlatPolicy,

    /// Consecutive flat ticks before falling back to stable.
    /// Only meaningful with `flat_policy: release`; must stay 1 with `hold`.
    pub release_frames: usize,
}

/// Foreground extraction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMethod {
    /// Gaussian mixture background subtractor
    Mog2,
    /// Absolute difference against a periodically refreshed background frame
    FrameDifference,
}

/// Motion segmentation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Foreground extraction method
    pub method: SegmentationMethod,

    /// Background subtractor history length
    pub history: i32,

    /// Background subtractor variance threshold
    pub var_threshold: f64,

    /// Let the subtractor mark shadows
    pub detect_shadows: bool,

    /// Gaussian blur kernel size (odd, 0 disables blurring)
    pub blur_kernel: i32,

    /// Binary threshold applied to the foreground mask
    pub binary_threshold: f64,

    /// Morphological opening kernel size (odd)
    pub morph_kernel: i32,

    /// Morphological opening iterations
    pub morph_iterations: i32,

    /// Regions at or below this area count as no detection
    pub min_region_area: f64,

    /// Square the bounding box before measuring its extent
    pub square_box: bool,

    /// Frames between background refreshes for frame differencing
    pub background_refresh_frames: u32,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the annotated video window
    pub gui: bool,

    /// Window title
    pub window_name: String,

    /// Requested capture width
    pub frame_width: i32,

    /// Requested capture height
    pub frame_height: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trend: TrendConfig::default(),
            debounce: DebounceConfig::default(),
            segmentation: SegmentationConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Delta,
            window_size: DEFAULT_WINDOW_SIZE,
            delta_threshold: DEFAULT_DELTA_THRESHOLD,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            confirm_frames: DEFAULT_CONFIRM_FRAMES,
            flat_policy: FlatPolicy::Release,
            release_frames: DEFAULT_RELEASE_FRAMES,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            method: SegmentationMethod::Mog2,
            history: DEFAULT_BG_HISTORY,
            var_threshold: DEFAULT_BG_VAR_THRESHOLD,
            detect_shadows: false,
            blur_kernel: DEFAULT_BLUR_KERNEL,
            binary_threshold: DEFAULT_BINARY_THRESHOLD,
            morph_kernel: DEFAULT_MORPH_KERNEL,
            morph_iterations: DEFAULT_MORPH_ITERATIONS,
            min_region_area: DEFAULT_MIN_REGION_AREA,
            square_box: true,
            background_refresh_frames: DEFAULT_BACKGROUND_REFRESH_FRAMES,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gui: true,
            window_name: "Proximity Monitor".to_string(),
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl TrendConfig {
    /// Create the configured trend policy
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the policy threshold is invalid
    pub fn create_policy(&self) -> Result<Box<dyn TrendPolicy>> {
        match self.policy {
            PolicyKind::Delta => {
                check_threshold("delta_threshold", self.delta_threshold)?;
                Ok(Box::new(DeltaPolicy::new(self.delta_threshold)))
            }
            PolicyKind::SplitAverage => {
                check_threshold("ratio_threshold", self.ratio_threshold)?;
                Ok(Box::new(SplitAveragePolicy::new(self.ratio_threshold)))
            }
            PolicyKind::MonotonicRun => Ok(Box::new(MonotonicRunPolicy::new())),
        }
    }

    /// Select the policy from a `name[:threshold]` description
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if the description is not a valid policy
    pub fn set_policy(&mut self, spec: &str) -> Result<()> {
        crate::trend::create_policy(spec)?;
        let (name, param) = match spec.split_once(':') {
            Some((name, raw)) => (name, Some(raw.trim())),
            None => (spec, None),
        };

        self.policy = name.parse()?;

        if let Some(raw) = param {
            let value: f64 = raw
                .parse()
                .map_err(|_| Error::PolicyError(format!("Invalid threshold '{raw}'")))?;
            match self.policy {
                PolicyKind::Delta => self.delta_threshold = value,
                PolicyKind::SplitAverage => self.ratio_threshold = value,
                PolicyKind::MonotonicRun => {}
            }
        }
        Ok(())
    }

    /// Create a trend estimator with the configured policy and window
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the policy or window size is invalid
    pub fn create_estimator(&self) -> Result<TrendEstimator> {
        TrendEstimator::new(self.create_policy()?, self.window_size)
    }

    /// Validate trend parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(Error::ConfigError(format!(
                "Window size must be at least {MIN_WINDOW_SIZE}"
            )));
        }
        if self.policy == PolicyKind::SplitAverage && self.window_size < SPLIT_AVERAGE_SAMPLES {
            return Err(Error::ConfigError(format!(
                "Split-average policy needs a window of at least {SPLIT_AVERAGE_SAMPLES}"
            )));
        }
        check_threshold("delta_threshold", self.delta_threshold)?;
        check_threshold("ratio_threshold", self.ratio_threshold)?;
        Ok(())
    }
}

impl DebounceConfig {
    /// Create a debouncer with these parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a frame count is zero
    pub fn create_debouncer(&self) -> Result<StateDebouncer> {
        self.validate()?;
        Ok(StateDebouncer::new(self.confirm_frames)
            .with_flat_policy(self.flat_policy)
            .with_release_frames(self.release_frames))
    }

    /// Validate debounce parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a frame count is zero
    pub fn validate(&self) -> Result<()> {
        if self.confirm_frames == 0 {
            return Err(Error::ConfigError(
                "Confirm frames must be greater than 0".to_string(),
            ));
        }
        if self.release_frames == 0 {
            return Err(Error::ConfigError(
                "Release frames must be greater than 0".to_string(),
            ));
        }
        if self.flat_policy == FlatPolicy::Hold && self.release_frames != DEFAULT_RELEASE_FRAMES {
            return Err(Error::ConfigError(format!(
                "Release frames ({}) have no effect with the hold flat policy",
                self.release_frames
            )));
        }
        Ok(())
    }
}

impl SegmentationConfig {
    /// Validate segmentation parameters
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel < 0 || (self.blur_kernel > 0 && self.blur_kernel % 2 == 0) {
            return Err(Error::ConfigError(
                "Blur kernel must be odd, or 0 to disable blurring".to_string(),
            ));
        }
        if self.morph_kernel <= 0 || self.morph_kernel % 2 == 0 {
            return Err(Error::ConfigError(
                "Morphology kernel must be odd and greater than 0".to_string(),
            ));
        }
        if self.morph_iterations < 0 {
            return Err(Error::ConfigError(
                "Morphology iterations must be non-negative".to_string(),
            ));
        }
        if self.history <= 0 {
            return Err(Error::ConfigError(
                "Background history must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=255.0).contains(&self.binary_threshold) {
            return Err(Error::ConfigError(
                "Binary threshold must be between 0 and 255".to_string(),
            ));
        }
        if !self.min_region_area.is_finite() || self.min_region_area < 0.0 {
            return Err(Error::ConfigError(
                "Minimum region area must be non-negative".to_string(),
            ));
        }
        if self.background_refresh_frames == 0 {
            return Err(Error::ConfigError(
                "Background refresh interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialize configuration as YAML
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Build a classifier from the trend and debounce sections
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either section is invalid
    pub fn create_classifier(&self) -> Result<ProximityClassifier> {
        self.trend.validate()?;
        let estimator = self.trend.create_estimator()?;
        let debouncer = self.debounce.create_debouncer()?;
        Ok(ProximityClassifier::new(estimator, debouncer))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        self.trend.validate()?;
        self.debounce.validate()?;
        self.segmentation.validate()?;

        if self.display.frame_width <= 0 || self.display.frame_height <= 0 {
            return Err(Error::ConfigError(
                "Frame size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Proximity Monitor Configuration

# Trend estimation
trend:
  policy: "delta"            # delta | split_average | monotonic_run
  window_size: 5
  delta_threshold: 2000.0
  ratio_threshold: 0.2

# State confirmation
debounce:
  confirm_frames: 2
  flat_policy: "release"     # release | hold
  release_frames: 1

# Motion segmentation
segmentation:
  method: "mog2"             # mog2 | frame_difference
  history: 500
  var_threshold: 50.0
  detect_shadows: false
  blur_kernel: 5
  binary_threshold: 200.0
  morph_kernel: 3
  morph_iterations: 2
  min_region_area: 500.0
  square_box: true
  background_refresh_frames: 30

# Display settings
display:
  gui: true
  window_name: "Proximity Monitor"
  frame_width: 640
  frame_height: 480
"#;
