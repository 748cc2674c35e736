//! Proximity monitoring library for real-time approach/recede detection.
//!
//! This library turns a noisy per-frame measurement of a moving region's
//! size (its *extent*) into a debounced proximity state:
//! `Approaching`, `Receding` or `Stable`.
//!
//! The classification pipeline consists of:
//! 1. A measurement source producing one extent per frame (0 when nothing is detected)
//! 2. A trend estimator deriving `Increasing` / `Decreasing` / `Flat` from a bounded history
//! 3. A state debouncer committing a state only after consistent trends
//!
//! With the `opencv` feature the crate also ships the camera front end:
//! background subtraction, contour extraction and on-screen rendering.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use proximity_monitor::{
//!     debounce::{ProximityState, StateDebouncer},
//!     classifier::ProximityClassifier,
//!     trend::{create_policy, TrendEstimator},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let estimator = TrendEstimator::new(create_policy("delta:2000")?, 2)?;
//! let mut classifier = ProximityClassifier::new(estimator, StateDebouncer::new(2));
//!
//! for extent in [1000.0, 4000.0, 7000.0] {
//!     classifier.tick(extent)?;
//! }
//! assert_eq!(classifier.current_state(), ProximityState::Approaching);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration and Replay
//!
//! ```
//! use proximity_monitor::{config::Config, pipeline, source::ReplaySource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::default();
//! config.trend.window_size = 2;
//! let mut classifier = config.create_classifier()?;
//!
//! let mut source = ReplaySource::new(vec![9000.0, 6000.0, 3000.0, 3000.0]);
//! let summary = pipeline::run(&mut source, &mut classifier)?;
//!
//! for transition in &summary.transitions {
//!     println!("{transition}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Reacting to Transitions
//!
//! ```
//! use proximity_monitor::{config::Config, debounce::Transition};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut classifier = Config::default().create_classifier()?;
//! classifier.subscribe(|t: &Transition| println!("{} -> {}", t.from, t.to));
//! classifier.tick(0.0)?;
//! # Ok(())
//! # }
//! ```

/// Trend estimation over a bounded extent history
pub mod trend;

/// Confirmation-count state machine
pub mod debounce;

/// Per-stream classifier combining trend and debounce
pub mod classifier;

/// Measurement sources and region geometry
pub mod source;

/// Tick loop over a measurement source
pub mod pipeline;

/// Region geometry helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

/// Motion segmentation of video frames
#[cfg(feature = "opencv")]
pub mod segmentation;

/// Main application module
#[cfg(feature = "opencv")]
pub mod app;

pub use classifier::ProximityClassifier;
pub use debounce::ProximityState;
pub use error::{Error, Result};
pub use trend::TrendSignal;
