//! # Example: Exponential Decay
//!
//! Solve the test equation with step-doubling control and compare against
//! the exact solution.
//!
//! Equation:
//! dy/dx = -3.5 y
//!
//! Initial condition: y(0) = 1.0
//!

use rkdoubling::{prelude::*, problems::ExponentialTest};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let problem = ExponentialTest::new(-3.5);
    let x_max = 3.0;
    let config = RunConfig::builder()
        .rhs(problem)
        .initial((0.0, 1.0))
        .h0(0.01)
        .x_max(x_max)
        .adaptive(true)
        .tolerance(1e-6)
        .analytic(Box::new(problem.solution(0.0, 1.0)))
        .build();

    match config.run() {
        Ok(trace) => {
            println!("{}", trace.labels().join(";"));
            for row in trace.to_table() {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:.6e}")).collect();
                println!("{}", cells.join(";"));
            }

            let summary = trace.summary(x_max);
            println!("Steps: {}", summary.steps);
            println!("Distance to x_max: {:?}", summary.distance_to_border);
            println!("Max error estimate: {:?}", summary.max_error);
            println!("Halvings: {}, doublings: {}", summary.halvings, summary.doublings);
            println!("Max step: {:?}", summary.max_step);
            println!("Min step: {:?}", summary.min_step);
            println!("Max |u - v|: {:?}", summary.max_absolute_error);
        }
        Err(failure) => eprintln!(
            "Integration failed after {} rows: {}",
            failure.partial.len(),
            failure
        ),
    }
}
