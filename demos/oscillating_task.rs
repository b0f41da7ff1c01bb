//! # Example: Oscillating Cubic Term
//!
//! Fixed-step and adaptive runs of
//!
//! dy/dx = x / (1 + x^2) y^2 + y - y^3 sin(10 x)
//!
//! with the same method, printing how the adaptive controller spends its
//! steps. Every accepted step is streamed through an observer.
//!

use rkdoubling::{prelude::*, problems::MainTask1};

fn main() {
    let tableau = Tableau::rk4();
    let initial = State::scalar(0.0, 1.0);
    let x_max = 2.0;

    let fixed = FixedStepIntegrator::new(&tableau, FixedSettings::default());
    match fixed.integrate(&MainTask1, initial, 0.01, x_max, 10_000) {
        Ok(trace) => {
            let last = trace.last().map(|r| r.y[0]);
            println!("Fixed step: {} steps, y(x_max) = {:?}", trace.len(), last);
        }
        Err(failure) => eprintln!("Fixed step failed: {failure}"),
    }

    let settings = AdaptiveSettings::builder()
        .tolerance(1e-7)
        .max_steps(10_000)
        .build();
    let controller = AdaptiveController::new(&tableau, settings);
    let mut print_row = |r: &AdaptiveRecord<1>| {
        let marker = match (r.halved, r.doubled) {
            (true, _) => "halved",
            (false, true) => "doubled",
            (false, false) => "",
        };
        println!("x = {:>8.5}  v = {:>12.8}  h = {:.3e}  {marker}", r.x, r.accepted[0], r.h);
        ControlFlag::Continue
    };
    match controller.run_with(&MainTask1, initial, 0.1, x_max, None, &mut print_row) {
        Ok(trace) => {
            let summary = trace.summary(x_max);
            println!(
                "Adaptive: {} steps, {} halvings, {} doublings",
                summary.steps, summary.halvings, summary.doublings
            );
        }
        Err(failure) => eprintln!("Adaptive run failed: {failure}"),
    }
}
