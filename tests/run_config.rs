use std::sync::Arc;

use approx::assert_relative_eq;
use rkdoubling::{
    prelude::*,
    problems::{BentRod, ExponentialTest},
};

mod common;
use common::{PENDULUM, decay};

#[test]
fn tableau_is_shared_between_threads() {
    let tableau = Arc::new(Tableau::rk4());
    let run = |tableau: Arc<Tableau>, y0: f64| {
        RunConfig::builder()
            .tableau(tableau)
            .rhs(decay)
            .initial((0.0, y0))
            .h0(0.1)
            .x_max(2.0)
            .adaptive(true)
            .tolerance(1e-8)
            .build()
            .run()
            .unwrap()
    };

    let sequential: Vec<_> = (1..=4).map(|i| run(tableau.clone(), i as f64)).collect();
    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|i| {
                let tableau = Arc::clone(&tableau);
                s.spawn(move || run(tableau, i as f64))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(sequential, parallel);
}

#[test]
fn custom_tableau() {
    // Ralston's second-order method
    let ralston = Tableau::new(2, vec![2.0 / 3.0], vec![vec![2.0 / 3.0]], vec![0.25, 0.75], 2)
        .unwrap();
    let problem = ExponentialTest::new(-1.0);
    let trace = RunConfig::builder()
        .tableau(ralston)
        .rhs(problem)
        .initial((0.0, 1.0))
        .h0(0.01)
        .x_max(1.0)
        .build()
        .run()
        .unwrap();
    let last = trace.final_state().unwrap();
    assert_relative_eq!(last.y[0], (-1.0f64).exp(), max_relative = 1e-4);
}

#[test]
fn malformed_tableau_is_rejected() {
    let err = Tableau::new(3, vec![0.5, 1.0], vec![vec![0.5]], vec![0.2, 0.6, 0.2], 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedTableau);
    assert!(!err.is_recoverable());
}

#[test]
fn euclidean_norm_on_a_system() {
    let config = RunConfig::builder()
        .rhs(PENDULUM)
        .initial((0.0, [1.0, 0.0]))
        .h0(0.2)
        .x_max(3.0)
        .adaptive(true)
        .tolerance(1e-6)
        .error_norm(ErrorNorm::Euclidean)
        .build();
    let trace = config.run().unwrap();
    for r in trace.as_adaptive().unwrap() {
        let [e1, e2] = r.component_errors;
        assert!(r.error >= e1.max(e2));
        assert!(r.error <= 1e-6);
    }
}

#[test]
fn bent_rod_deflection_is_monotone() {
    let trace = RunConfig::builder()
        .rhs(BentRod { k: 0.5, l: 1.0 })
        .initial((0.0, [0.0, 0.0]))
        .h0(0.1)
        .x_max(1.0)
        .adaptive(true)
        .tolerance(1e-8)
        .build()
        .run()
        .unwrap();
    let slopes: Vec<f64> = trace
        .as_adaptive()
        .unwrap()
        .iter()
        .map(|r| r.accepted[1])
        .collect();
    assert!(slopes.windows(2).all(|w| w[1] >= w[0]));
    assert!(slopes.iter().all(|&s| s > 0.0));
}

#[test]
fn failure_displays_the_error() {
    let failure = RunConfig::builder()
        .rhs(decay)
        .initial((0.0, 1.0))
        .h0(0.1)
        .x_max(10.0)
        .max_steps(5)
        .build()
        .run()
        .unwrap_err();
    assert_eq!(failure.to_string(), failure.error.to_string());
    let source = std::error::Error::source(&failure).unwrap();
    assert!(source.to_string().contains("not reached within 5 steps"));
}
