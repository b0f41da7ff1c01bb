//! User-supplied right-hand side.

use crate::Float;

/// User-supplied ODE right-hand side `y' = f(x, y)` for an `N`-component state.
///
/// `N = 1` is a scalar equation. `N = 2` is a second-order equation reduced to
/// first order, with `y[1] = dy[0]/dx`. The integrator calls `ode` with the
/// abscissa `x` and state `y` and expects the derivative in `dydx`.
///
/// Closures `Fn(Float, &[Float; N]) -> [Float; N]` implement this trait, so
/// simple problems need no struct.
///
/// # Example
///
/// ```
/// use rkdoubling::prelude::*;
///
/// struct Pendulum { a: f64, b: f64 }
///
/// impl ODE<2> for Pendulum {
///     fn ode(&self, _x: f64, y: &[f64; 2], dydx: &mut [f64; 2]) {
///         dydx[0] = y[1];
///         dydx[1] = -self.a * y[1] + self.b * y[0].sin();
///     }
/// }
/// ```
pub trait ODE<const N: usize> {
    fn ode(&self, x: Float, y: &[Float; N], dydx: &mut [Float; N]);
}

impl<F, const N: usize> ODE<N> for F
where
    F: Fn(Float, &[Float; N]) -> [Float; N],
{
    fn ode(&self, x: Float, y: &[Float; N], dydx: &mut [Float; N]) {
        *dydx = self(x, y);
    }
}
