//! Integration tests for the proximity classification pipeline


use std::sync::{Arc, Mutex};
use std::thread;

use proptest::prelude::*;
use proximity_monitor::{
    config::{Config, PolicyKind},
    debounce::{FlatPolicy, ProximityState, Transition},
    pipeline,
    source::{ExtentFileSource, Measurement, ReplaySource},
    trend::TrendSignal,
};
use test_helpers::{create_holding_classifier, create_test_classifier, feed_states, feed_transitions, ramp};

/// Approach, pause, then recede with the default delta policy
#[test]
fn test_approach_pause_recede() {
    let mut classifier = Config::default().create_classifier().unwrap();

    let mut extents = ramp(10_000.0, 3_000.0, 8);
    extents.extend(std::iter::repeat(31_000.0).take(4));
    extents.extend(ramp(31_000.0, -3_000.0, 8));

    let transitions = feed_transitions(&mut classifier, &extents).unwrap();
    let targets: Vec<ProximityState> = transitions.iter().map(|t| t.to).collect();

    assert_eq!(
        targets,
        vec![
            ProximityState::Approaching,
            ProximityState::Stable,
            ProximityState::Receding
        ]
    );
    assert_eq!(classifier.current_state(), ProximityState::Receding);
}

#[test]
fn test_first_confirmation_tick() {
    // Window 5 warms up at tick 4, two agreeing ticks confirm at tick 5
    let mut classifier = create_test_classifier("delta:2000", 5, 2).unwrap();
    let transitions = feed_transitions(&mut classifier, &ramp(0.0, 5_000.0, 10)).unwrap();

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].tick_index, 5);
    assert_eq!(transitions[0].from, ProximityState::Stable);
}

#[test]
fn test_constant_extent_stays_stable() {
    for policy in ["delta", "split_average", "monotonic_run"] {
        let mut classifier = create_test_classifier(policy, 5, 1).unwrap();
        let states = feed_states(&mut classifier, &[12_345.0; 30]).unwrap();
        assert!(states.iter().all(|&s| s == ProximityState::Stable), "policy {policy}");
    }
}

#[test]
fn test_hold_survives_pause() {
    let mut classifier = create_holding_classifier("delta:2000", 2, 2).unwrap();

    let mut extents = ramp(10_000.0, 5_000.0, 5);
    extents.extend(std::iter::repeat(30_000.0).take(20));

    let states = feed_states(&mut classifier, &extents).unwrap();
    assert_eq!(states.last(), Some(&ProximityState::Approaching));
}

#[test]
fn test_pipeline_over_replay_source() {
    let mut classifier = create_test_classifier("delta:100", 2, 1).unwrap();
    let mut source = ReplaySource::new([100.0, 500.0, 900.0, 900.0, 400.0]);

    let summary = pipeline::run(&mut source, &mut classifier).unwrap();

    assert_eq!(summary.ticks, 5);
    assert_eq!(summary.final_state, ProximityState::Receding);
    let targets: Vec<ProximityState> = summary.transitions.iter().map(|t| t.to).collect();
    assert_eq!(
        targets,
        vec![
            ProximityState::Approaching,
            ProximityState::Stable,
            ProximityState::Receding
        ]
    );
}

#[test]
fn test_absent_measurements_count_as_zero_extent() {
    let mut classifier = create_test_classifier("delta:1000", 2, 1).unwrap();
    let mut source = ReplaySource::from_measurements(vec![
        Measurement::new(5_000.0),
        Measurement::absent(),
    ]);

    let summary = pipeline::run(&mut source, &mut classifier).unwrap();
    assert_eq!(summary.final_state, ProximityState::Receding);
}

#[test]
fn test_run_with_reports_every_tick() {
    let mut classifier = create_test_classifier("monotonic_run", 3, 1).unwrap();
    let mut source = ReplaySource::new(ramp(100.0, 10.0, 6));

    let mut trends = Vec::new();
    let summary = pipeline::run_with(&mut source, &mut classifier, |outcome| trends.push(outcome.trend)).unwrap();

    assert_eq!(summary.ticks, 6);
    assert_eq!(trends[..2], [TrendSignal::Flat; 2]);
    assert!(trends[2..].iter().all(|&t| t == TrendSignal::Increasing));
}

#[test]
fn test_extent_text_through_pipeline() {
    let text = "# recorded session\n1000\n4000\n\n7000,10,10,80,80\nnone\n";
    let mut source = ExtentFileSource::new(text.as_bytes());
    let mut classifier = create_test_classifier("delta:2000", 2, 1).unwrap();

    let summary = pipeline::run(&mut source, &mut classifier).unwrap();

    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.final_state, ProximityState::Receding);
}

#[test]
fn test_observer_sees_same_transitions_as_summary() {
    let mut classifier = create_test_classifier("delta:10", 2, 1).unwrap();
    let seen: Arc<Mutex<Vec<Transition>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    classifier.subscribe(move |t: &Transition| sink.lock().unwrap().push(*t));

    let mut source = ReplaySource::new([0.0, 100.0, 200.0, 100.0, 0.0, 0.0]);
    let summary = pipeline::run(&mut source, &mut classifier).unwrap();

    assert_eq!(*seen.lock().unwrap(), summary.transitions);
}

#[test]
fn test_independent_classifiers_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut classifier = create_test_classifier("delta:100", 3, 2).unwrap();
                let step = if i % 2 == 0 { 500.0 } else { -500.0 };
                let extents = ramp(50_000.0, step, 20);
                feed_states(&mut classifier, &extents).unwrap().pop()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 {
            ProximityState::Approaching
        } else {
            ProximityState::Receding
        };
        assert_eq!(handle.join().unwrap(), Some(expected));
    }
}

#[test]
fn test_config_file_round_trip_drives_classifier() {
    let mut config = Config::default();
    config.trend.set_policy("split_average:0.1").unwrap();
    config.trend.window_size = 6;
    config.debounce.confirm_frames = 1;
    config.debounce.flat_policy = FlatPolicy::Hold;

    let path = std::env::temp_dir().join(format!("proximity_monitor_it_{}.yaml", std::process::id()));
    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.trend.policy, PolicyKind::SplitAverage);

    let mut classifier = loaded.create_classifier().unwrap();
    let states = feed_states(&mut classifier, &[1000.0, 1000.0, 2000.0, 2000.0]).unwrap();
    assert_eq!(states.last(), Some(&ProximityState::Approaching));
}

#[test]
fn test_reset_matches_fresh_instance() {
    let extents = ramp(1_000.0, 700.0, 12);

    let mut reused = create_test_classifier("delta:500", 3, 2).unwrap();
    feed_states(&mut reused, &ramp(90_000.0, -4_000.0, 9)).unwrap();
    reused.reset();

    let mut fresh = create_test_classifier("delta:500", 3, 2).unwrap();
    assert_eq!(
        feed_states(&mut reused, &extents).unwrap(),
        feed_states(&mut fresh, &extents).unwrap()
    );
}

proptest! {
    #[test]
    fn prop_same_input_same_output(
        extents in prop::collection::vec(0.0f64..100_000.0, 0..80),
        window in 4usize..8,
        confirm in 1usize..4,
    ) {
        for policy in ["delta:1000", "split_average:0.1", "monotonic_run"] {
            let mut a = create_test_classifier(policy, window, confirm).unwrap();
            let mut b = create_test_classifier(policy, window, confirm).unwrap();
            prop_assert_eq!(
                feed_transitions(&mut a, &extents).unwrap(),
                feed_transitions(&mut b, &extents).unwrap()
            );
        }
    }

    #[test]
    fn prop_window_never_exceeds_capacity(
        extents in prop::collection::vec(0.0f64..1e7, 0..100),
        window in 2usize..10,
    ) {
        let mut classifier = create_test_classifier("delta", window, 2).unwrap();
        for extent in extents {
            classifier.tick(extent).unwrap();
            prop_assert!(classifier.estimator().window().len() <= window);
        }
    }
}
