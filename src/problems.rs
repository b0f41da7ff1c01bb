//! Ready-made right-hand sides.
//!
//! These are the equations the step-doubling controller is usually exercised
//! on: a linear test equation with a known solution, a stiff-ish scalar task
//! with an oscillating cubic term, a damped pendulum and a bent rod.

use serde::{Deserialize, Serialize};

use crate::{Float, core::ode::ODE};

/// `y' = rate * y`, solved by `y0 * exp(rate * (x - x0))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialTest {
    pub rate: Float,
}

impl ExponentialTest {
    pub fn new(rate: Float) -> Self {
        Self { rate }
    }

    /// Exact solution through `(x0, y0)`.
    pub fn solution(
        &self,
        x0: Float,
        y0: Float,
    ) -> impl Fn(Float) -> [Float; 1] + Send + Sync + 'static {
        let rate = self.rate;
        move |x| [y0 * (rate * (x - x0)).exp()]
    }
}

impl Default for ExponentialTest {
    fn default() -> Self {
        Self { rate: 1.0 }
    }
}

impl ODE<1> for ExponentialTest {
    fn ode(&self, _x: Float, y: &[Float; 1], dydx: &mut [Float; 1]) {
        dydx[0] = self.rate * y[0];
    }
}

/// `y' = x / (1 + x^2) * y^2 + y - y^3 * sin(10 x)`.
///
/// No closed form; the cubic term makes large initial values blow up quickly,
/// which is a good way to watch the controller halve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MainTask1;

impl ODE<1> for MainTask1 {
    fn ode(&self, x: Float, y: &[Float; 1], dydx: &mut [Float; 1]) {
        let y = y[0];
        dydx[0] = x / (1.0 + x * x) * y * y + y - y.powi(3) * (10.0 * x).sin();
    }
}

/// `y1' = y2`, `y2' = -a y2 + b sin(y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pendulum {
    /// Damping.
    pub a: Float,
    pub b: Float,
}

impl ODE<2> for Pendulum {
    fn ode(&self, _x: Float, y: &[Float; 2], dydx: &mut [Float; 2]) {
        dydx[0] = y[1];
        dydx[1] = -self.a * y[1] + self.b * y[0].sin();
    }
}

/// Deflection of a cantilevered rod of length `l` under load `k`:
/// `y1' = y2`, `y2' = k (l - x) (1 + y2^2)^(3/2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BentRod {
    pub k: Float,
    pub l: Float,
}

impl ODE<2> for BentRod {
    fn ode(&self, x: Float, y: &[Float; 2], dydx: &mut [Float; 2]) {
        dydx[0] = y[1];
        dydx[1] = self.k * (self.l - x) * (1.0 + y[1] * y[1]).powf(1.5);
    }
}
