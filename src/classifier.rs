//! Proximity classifier combining the trend estimator and the state debouncer.
//!
//! One [`ProximityClassifier`] classifies one stream. It owns its history
//! window and confirmation counters; independent streams need independent
//! instances.

use log::{error, info};

use crate::debounce::{ProximityState, StateDebouncer, Transition};
use crate::source::Measurement;
use crate::trend::{TrendEstimator, TrendSignal};
use crate::{Error, Result};

/// Consumer of confirmed state changes
pub trait TransitionObserver: Send {
    fn on_transition(&mut self, transition: &Transition);
}

impl<F> TransitionObserver for F
where
    F: FnMut(&Transition) + Send,
{
    fn on_transition(&mut self, transition: &Transition) {
        self(transition);
    }
}

/// Everything one tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Zero-based index of this tick
    pub tick_index: u64,
    pub extent: f64,
    pub trend: TrendSignal,
    /// Confirmed state after this tick
    pub state: ProximityState,
    /// Set only when this tick changed the confirmed state
    pub transition: Option<Transition>,
}

/// Per-stream approaching/receding classifier
pub struct ProximityClassifier {
    estimator: TrendEstimator,
    debouncer: StateDebouncer,
    observers: Vec<Box<dyn TransitionObserver>>,
    ticks: u64,
    poisoned: bool,
}

impl ProximityClassifier {
    #[must_use]
    pub fn new(estimator: TrendEstimator, debouncer: StateDebouncer) -> Self {
        info!(
            "Classifier using {} over {} samples, confirming after {} ticks",
            estimator.policy_name(),
            estimator.window().capacity(),
            debouncer.confirm_frames()
        );
        Self {
            estimator,
            debouncer,
            observers: Vec::new(),
            ticks: 0,
            poisoned: false,
        }
    }

    /// Register an observer called on every confirmed transition
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: TransitionObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Process one extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidExtent` for negative or non-finite extents. That is a
    /// contract violation: the classifier is poisoned and every later call
    /// returns `Poisoned`.
    pub fn tick(&mut self, extent: f64) -> Result<TickOutcome> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }

        if !extent.is_finite() || extent < 0.0 {
            self.poisoned = true;
            error!("Rejected extent {extent} at tick {}", self.ticks);
            return Err(Error::InvalidExtent(format!(
                "extent must be finite and non-negative, got {extent} at tick {}",
                self.ticks
            )));
        }

        let tick_index = self.ticks;
        self.ticks += 1;

        let trend = self.estimator.observe(extent);
        let update = self.debouncer.update(trend);

        if let Some(transition) = &update.transition {
            info!("{} confirmed at tick {}", transition.to, transition.tick_index);
            for observer in &mut self.observers {
                observer.on_transition(transition);
            }
        }

        Ok(TickOutcome {
            tick_index,
            extent,
            trend,
            state: update.state,
            transition: update.transition,
        })
    }

    /// Process one measurement, ignoring its geometry
    ///
    /// # Errors
    ///
    /// Same as [`ProximityClassifier::tick`]
    pub fn observe(&mut self, measurement: &Measurement) -> Result<TickOutcome> {
        self.tick(measurement.extent)
    }

    #[must_use]
    pub fn current_state(&self) -> ProximityState {
        self.debouncer.state()
    }

    /// Number of accepted ticks
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    #[must_use]
    pub fn estimator(&self) -> &TrendEstimator {
        &self.estimator
    }

    #[must_use]
    pub fn debouncer(&self) -> &StateDebouncer {
        &self.debouncer
    }

    /// Clear history and counters and return to `Stable`.
    ///
    /// Observers stay registered. A poisoned classifier stays poisoned.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.debouncer.reset();
        self.ticks = 0;
    }
}
