//! Tick loop driving a classifier from a measurement source.

use log::{debug, info};

use crate::classifier::{ProximityClassifier, TickOutcome};
use crate::debounce::{ProximityState, Transition};
use crate::source::MeasurementSource;
use crate::Result;

/// What a finished run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks processed before end of stream
    pub ticks: u64,
    /// Confirmed transitions in order
    pub transitions: Vec<Transition>,
    pub final_state: ProximityState,
}

/// Poll `source` until end of stream, feeding every measurement to `classifier`
///
/// # Errors
///
/// Stops at the first source error or contract violation and returns it
pub fn run<S>(source: &mut S, classifier: &mut ProximityClassifier) -> Result<RunSummary>
where
    S: MeasurementSource + ?Sized,
{
    run_with(source, classifier, |_| {})
}

/// Like [`run`], calling `on_tick` after every processed tick
///
/// # Errors
///
/// Stops at the first source error or contract violation and returns it
pub fn run_with<S, F>(
    source: &mut S,
    classifier: &mut ProximityClassifier,
    mut on_tick: F,
) -> Result<RunSummary>
where
    S: MeasurementSource + ?Sized,
    F: FnMut(&TickOutcome),
{
    let mut ticks = 0;
    let mut transitions = Vec::new();

    while let Some(measurement) = source.next_measurement()? {
        let outcome = classifier.observe(&measurement)?;
        debug!(
            "Tick {}: extent={:.1} trend={} state={}",
            outcome.tick_index, outcome.extent, outcome.trend, outcome.state
        );

        if let Some(transition) = outcome.transition {
            transitions.push(transition);
        }
        ticks += 1;
        on_tick(&outcome);
    }

    info!("End of stream after {ticks} ticks, {} transitions", transitions.len());

    Ok(RunSummary {
        ticks,
        transitions,
        final_state: classifier.current_state(),
    })
}
