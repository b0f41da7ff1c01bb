//! # Example: Damped Pendulum
//!
//! Second-order equation reduced to a two-component system and integrated
//! with step-doubling control, both error norms side by side.
//!
//! Equations:
//! dy1/dx = y2
//! dy2/dx = -a y2 + b sin(y1)
//!
//! Initial condition: y1(0) = 1.0, y2(0) = 0.0
//!

use rkdoubling::{prelude::*, problems::Pendulum};

fn main() {
    let pendulum = Pendulum { a: 0.1, b: -9.81 };
    let x_max = 10.0;

    for norm in [ErrorNorm::Max, ErrorNorm::Euclidean] {
        let config = RunConfig::builder()
            .rhs(pendulum)
            .initial((0.0, [1.0, 0.0]))
            .h0(0.1)
            .x_max(x_max)
            .adaptive(true)
            .tolerance(1e-8)
            .error_norm(norm)
            .build();

        match config.run() {
            Ok(trace) => {
                let summary = trace.summary(x_max);
                println!("{norm:?} norm: {} steps", summary.steps);
                println!(
                    "  halvings: {}, doublings: {}",
                    summary.halvings, summary.doublings
                );
                if let Some(state) = trace.final_state() {
                    println!("  y({:.3}) = {:?}", state.x, state.y);
                }
            }
            Err(failure) => eprintln!("{norm:?} norm failed: {failure}"),
        }
    }
}
