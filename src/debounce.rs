//! Confirmation-count state machine turning per-tick trends into a stable
//! proximity state.
//!
//! A direction is only committed after `confirm_frames` consecutive ticks
//! agree on it. Any disagreeing tick resets the run. What happens on `Flat`
//! ticks while a direction is confirmed is governed by [`FlatPolicy`].

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::trend::TrendSignal;
use crate::{Error, Result};

/// Confirmed proximity state exposed to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProximityState {
    /// No directional claim
    #[default]
    Stable,
    /// Region confirmed growing
    Approaching,
    /// Region confirmed shrinking
    Receding,
}

impl ProximityState {
    /// Mirror image of the state (`Approaching` <-> `Receding`)
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Approaching => Self::Receding,
            Self::Receding => Self::Approaching,
            Self::Stable => Self::Stable,
        }
    }
}

impl fmt::Display for ProximityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stable => "Stable",
            Self::Approaching => "Approaching",
            Self::Receding => "Receding",
        };
        f.write_str(name)
    }
}

impl FromStr for ProximityState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "approaching" => Ok(Self::Approaching),
            "receding" => Ok(Self::Receding),
            other => Err(Error::ContractViolation(format!("Unknown proximity state: {other}"))),
        }
    }
}

/// Behaviour on `Flat` ticks while a direction is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatPolicy {
    /// Fall back to `Stable` after `release_frames` consecutive flat ticks
    #[default]
    Release,
    /// Keep the confirmed direction until another direction is confirmed
    Hold,
}

impl FromStr for FlatPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "hold" => Ok(Self::Hold),
            other => Err(Error::ConfigError(format!("Unknown flat policy: {other}"))),
        }
    }
}

/// A committed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ProximityState,
    pub to: ProximityState,
    /// Zero-based index of the tick that caused the change
    pub tick_index: u64,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} at tick {}", self.from, self.to, self.tick_index)
    }
}

/// Result of feeding one trend to the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceUpdate {
    pub state: ProximityState,
    pub transition: Option<Transition>,
}

/// Hysteresis state machine over trend signals
#[derive(Debug, Clone)]
pub struct StateDebouncer {
    confirm_frames: usize,
    flat_policy: FlatPolicy,
    release_frames: usize,
    state: ProximityState,
    approach_run: usize,
    recede_run: usize,
    flat_run: usize,
    updates: u64,
}

impl StateDebouncer {
    /// Create a debouncer that needs `confirm_frames` agreeing ticks to commit
    ///
    /// Starts in `Stable` with [`FlatPolicy::Release`] after a single flat tick.
    ///
    /// # Panics
    ///
    /// Panics if `confirm_frames` is zero
    #[must_use]
    pub fn new(confirm_frames: usize) -> Self {
        assert!(confirm_frames > 0, "Confirm frames must be greater than 0");
        Self {
            confirm_frames,
            flat_policy: FlatPolicy::Release,
            release_frames: 1,
            state: ProximityState::Stable,
            approach_run: 0,
            recede_run: 0,
            flat_run: 0,
            updates: 0,
        }
    }

    /// Set the behaviour on flat ticks
    #[must_use]
    pub fn with_flat_policy(mut self, flat_policy: FlatPolicy) -> Self {
        self.flat_policy = flat_policy;
        self
    }

    /// Require `release_frames` consecutive flat ticks before leaving a direction
    ///
    /// Has no effect under [`FlatPolicy::Hold`].
    ///
    /// # Panics
    ///
    /// Panics if `release_frames` is zero
    #[must_use]
    pub fn with_release_frames(mut self, release_frames: usize) -> Self {
        assert!(release_frames > 0, "Release frames must be greater than 0");
        self.release_frames = release_frames;
        self
    }

    /// Feed one trend signal and return the (possibly new) confirmed state
    pub fn update(&mut self, trend: TrendSignal) -> DebounceUpdate {
        let tick_index = self.updates;
        self.updates = self.updates.saturating_add(1);

        let target = match trend {
            TrendSignal::Increasing => {
                self.approach_run = self.approach_run.saturating_add(1);
                self.recede_run = 0;
                self.flat_run = 0;
                (self.approach_run >= self.confirm_frames).then_some(ProximityState::Approaching)
            }
            TrendSignal::Decreasing => {
                self.recede_run = self.recede_run.saturating_add(1);
                self.approach_run = 0;
                self.flat_run = 0;
                (self.recede_run >= self.confirm_frames).then_some(ProximityState::Receding)
            }
            TrendSignal::Flat => {
                self.approach_run = 0;
                self.recede_run = 0;
                self.flat_run = self.flat_run.saturating_add(1);
                match self.flat_policy {
                    FlatPolicy::Release if self.flat_run >= self.release_frames => {
                        Some(ProximityState::Stable)
                    }
                    _ => None,
                }
            }
        };

        debug!(
            "Tick {tick_index}: trend={trend} approach_run={} recede_run={} flat_run={}",
            self.approach_run, self.recede_run, self.flat_run
        );

        let transition = match target {
            Some(next) if next != self.state => {
                let transition = Transition {
                    from: self.state,
                    to: next,
                    tick_index,
                };
                self.state = next;
                Some(transition)
            }
            _ => None,
        };

        DebounceUpdate {
            state: self.state,
            transition,
        }
    }

    #[must_use]
    pub fn state(&self) -> ProximityState {
        self.state
    }

    #[must_use]
    pub fn approach_run(&self) -> usize {
        self.approach_run
    }

    #[must_use]
    pub fn recede_run(&self) -> usize {
        self.recede_run
    }

    #[must_use]
    pub fn flat_run(&self) -> usize {
        self.flat_run
    }

    #[must_use]
    pub fn confirm_frames(&self) -> usize {
        self.confirm_frames
    }

    #[must_use]
    pub fn flat_policy(&self) -> FlatPolicy {
        self.flat_policy
    }

    /// Return to `Stable` with cleared counters
    pub fn reset(&mut self) {
        self.state = ProximityState::Stable;
        self.approach_run = 0;
        self.recede_run = 0;
        self.flat_run = 0;
        self.updates = 0;
    }
}
