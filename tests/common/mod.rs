#![allow(dead_code)]

use rkdoubling::{Float, problems::Pendulum};

/// Log controller decisions when running with `RUST_LOG=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn decay(_x: Float, y: &[Float; 1]) -> [Float; 1] {
    [-y[0]]
}

pub fn growth(_x: Float, y: &[Float; 1]) -> [Float; 1] {
    [y[0]]
}

/// Lightly damped pendulum with a restoring force.
pub const PENDULUM: Pendulum = Pendulum { a: 0.2, b: -1.0 };

pub fn strictly_increasing(xs: &[Float]) -> bool {
    xs.windows(2).all(|w| w[1] > w[0])
}
