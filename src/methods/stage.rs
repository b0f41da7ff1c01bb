//! One explicit Runge-Kutta step driven by a [`Tableau`].

use tracing::trace;

use crate::{
    Float,
    core::{ode::ODE, state::State},
    error::Error,
    methods::tableau::Tableau,
};

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult<const N: usize> {
    pub state: State<N>,
    /// Number of stages evaluated (the tableau's `s`).
    pub stages_used: usize,
}

/// Evaluates the stages of a tableau for one step.
///
/// Holds no state of its own besides the borrowed tableau, so the same
/// evaluator can be used for any number of steps and runs.
#[derive(Debug, Clone, Copy)]
pub struct StageEvaluator<'a> {
    tableau: &'a Tableau,
}

impl<'a> StageEvaluator<'a> {
    pub fn new(tableau: &'a Tableau) -> Self {
        Self { tableau }
    }

    pub fn tableau(&self) -> &'a Tableau {
        self.tableau
    }

    /// Advance `state` by `h`.
    ///
    /// Stage `i` is evaluated at `x + a[i-2] h` and
    /// `y + h * sum_j b[i-2][j] k_j`, component-wise with the coupling shared
    /// across components; the new state is `(x + h, y + h * sum_i p[i] k_i)`.
    ///
    /// Fails with [`Error::NonFiniteDerivative`] as soon as any stage
    /// derivative, or the advanced state, is NaN or infinite.
    pub fn evaluate_step<F, const N: usize>(
        &self,
        state: &State<N>,
        h: Float,
        f: &F,
    ) -> Result<StepResult<N>, Error>
    where
        F: ODE<N> + ?Sized,
    {
        let s = self.tableau.stage_count();
        let State { x, y } = *state;
        let mut k: Vec<[Float; N]> = Vec::with_capacity(s);

        let mut k1 = [0.0; N];
        f.ode(x, &y, &mut k1);
        check_stage(x, 1, &k1)?;
        k.push(k1);

        for (stage, (a, b)) in self
            .tableau
            .node_offsets()
            .iter()
            .zip(self.tableau.coupling())
            .enumerate()
        {
            let xs = x + a * h;
            let ys: [Float; N] = std::array::from_fn(|c| {
                y[c] + h * b.iter().zip(&k).map(|(bj, kj)| bj * kj[c]).sum::<Float>()
            });
            let mut ki = [0.0; N];
            f.ode(xs, &ys, &mut ki);
            check_stage(xs, stage + 2, &ki)?;
            k.push(ki);
        }

        let weights = self.tableau.weights();
        let y_new: [Float; N] = std::array::from_fn(|c| {
            y[c] + h * weights.iter().zip(&k).map(|(p, ki)| p * ki[c]).sum::<Float>()
        });
        let next = State::new(x + h, y_new);
        if !next.is_finite() {
            return Err(Error::NonFiniteDerivative { x: next.x, stage: s });
        }
        trace!(x, h, ?y_new, "step evaluated");

        Ok(StepResult {
            state: next,
            stages_used: s,
        })
    }
}

fn check_stage<const N: usize>(x: Float, stage: usize, k: &[Float; N]) -> Result<(), Error> {
    if k.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::NonFiniteDerivative { x, stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn heun_single_step_matches_hand_computation() {
        let t = Tableau::heun();
        let ev = StageEvaluator::new(&t);
        let rhs = |_x: Float, y: &[Float; 1]| [2.0 * y[0]];
        let r = ev.evaluate_step(&State::scalar(1.0, 1.0), 0.01, &rhs).unwrap();
        assert_abs_diff_eq!(r.state.y[0], 1.0202, epsilon = 1e-9);
        assert_abs_diff_eq!(r.state.x, 1.01, epsilon = 1e-12);
        assert_eq!(r.stages_used, 2);
    }

    #[test]
    fn midpoint_uses_node_offset_for_x() {
        // dy/dx = x: midpoint integrates it exactly.
        let t = Tableau::midpoint();
        let ev = StageEvaluator::new(&t);
        let rhs = |x: Float, _y: &[Float; 1]| [x];
        let r = ev.evaluate_step(&State::scalar(1.0, 0.0), 0.5, &rhs).unwrap();
        assert_abs_diff_eq!(r.state.y[0], 0.5 * (1.5 * 1.5 - 1.0), epsilon = 1e-14);
    }

    #[test]
    fn rk4_system_step_matches_closed_form() {
        // Harmonic oscillator: one RK4 step reproduces the Taylor series to h^4.
        let t = Tableau::rk4();
        let ev = StageEvaluator::new(&t);
        let rhs = |_x: Float, y: &[Float; 2]| [y[1], -y[0]];
        let h: Float = 0.1;
        let r = ev.evaluate_step(&State::system(0.0, 1.0, 0.0), h, &rhs).unwrap();
        let c = 1.0 - h * h / 2.0 + h.powi(4) / 24.0;
        let s = -(h - h.powi(3) / 6.0);
        assert_abs_diff_eq!(r.state.y[0], c, epsilon = 1e-15);
        assert_abs_diff_eq!(r.state.y[1], s, epsilon = 1e-15);
    }

    #[test]
    fn non_finite_stage_is_reported_with_stage_index() {
        let t = Tableau::rk4();
        let ev = StageEvaluator::new(&t);
        // Finite at the left end, NaN from the midpoint on.
        let rhs = |x: Float, _y: &[Float; 1]| if x > 0.0 { [Float::NAN] } else { [1.0] };
        let err = ev.evaluate_step(&State::scalar(0.0, 0.0), 0.1, &rhs).unwrap_err();
        assert_eq!(err, Error::NonFiniteDerivative { x: 0.05, stage: 2 });
    }

    #[test]
    fn overflowing_state_is_reported() {
        let t = Tableau::euler();
        let ev = StageEvaluator::new(&t);
        let rhs = |_x: Float, _y: &[Float; 1]| [Float::MAX];
        let err = ev.evaluate_step(&State::scalar(0.0, Float::MAX), 10.0, &rhs).unwrap_err();
        assert!(matches!(err, Error::NonFiniteDerivative { stage: 1, .. }));
    }
}
