//! Fixed-step explicit Runge-Kutta integration.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
    Float,
    core::{
        ode::ODE,
        row::FixedRow,
        solout::{ControlFlag, DummySolOut, SolOut},
        state::State,
        trace::Trace,
    },
    error::{Error, Failure, Outcome},
    methods::{
        settings::{FixedSettings, first_error, reached, validate_run},
        stage::StageEvaluator,
        tableau::Tableau,
    },
};

/// Exact solution `x -> y(x)` used to annotate rows with the true error.
pub type Analytic<'a, const N: usize> = &'a dyn Fn(Float) -> [Float; N];

/// Integrates on the uniform grid `x0, x0 + h, ...`, clamping the last step
/// so the run lands on `x_max`.
#[derive(Debug, Clone)]
pub struct FixedStepIntegrator<'a> {
    evaluator: StageEvaluator<'a>,
    settings: FixedSettings,
}

impl<'a> FixedStepIntegrator<'a> {
    pub fn new(tableau: &'a Tableau, settings: FixedSettings) -> Self {
        Self {
            evaluator: StageEvaluator::new(tableau),
            settings,
        }
    }

    pub fn settings(&self) -> &FixedSettings {
        &self.settings
    }

    /// Lazy sequence of states, one per step.
    ///
    /// Nothing is evaluated until the iterator is polled. Every call starts
    /// from `initial` again, so a run can be repeated by calling `run` twice.
    /// The iterator yields at most one `Err` and then ends.
    pub fn run<'r, F, const N: usize>(
        &'r self,
        f: &'r F,
        initial: State<N>,
        h: Float,
        x_max: Float,
        max_steps: usize,
    ) -> Result<FixedSteps<'r, F, N>, Error>
    where
        F: ODE<N> + ?Sized,
    {
        first_error(validate_run(
            initial.x,
            x_max,
            h,
            max_steps,
            self.settings.epsilon_border,
        ))?;

        Ok(FixedSteps {
            evaluator: self.evaluator,
            f,
            state: initial,
            h,
            x_max,
            max_steps,
            settings: &self.settings,
            steps: 0,
            started: Instant::now(),
            done: false,
        })
    }

    /// Run to `x_max` and collect every step into a trace.
    pub fn integrate<F, const N: usize>(
        &self,
        f: &F,
        initial: State<N>,
        h: Float,
        x_max: Float,
        max_steps: usize,
    ) -> Outcome<Trace<FixedRow<N>>>
    where
        F: ODE<N> + ?Sized,
    {
        self.integrate_with(f, initial, h, x_max, max_steps, None, &mut DummySolOut)
    }

    /// Like [`integrate`](Self::integrate), additionally annotating each row
    /// with `analytic(x)` and showing it to `solout` before it is recorded.
    #[allow(clippy::too_many_arguments)]
    pub fn integrate_with<F, S, const N: usize>(
        &self,
        f: &F,
        initial: State<N>,
        h: Float,
        x_max: Float,
        max_steps: usize,
        analytic: Option<Analytic<'_, N>>,
        solout: &mut S,
    ) -> Outcome<Trace<FixedRow<N>>>
    where
        F: ODE<N> + ?Sized,
        S: SolOut<FixedRow<N>>,
    {
        let mut trace = Trace::new();
        let steps = match self.run(f, initial, h, x_max, max_steps) {
            Ok(steps) => steps,
            Err(error) => return Err(Failure::new(error, trace)),
        };

        for step in steps {
            let state = match step {
                Ok(state) => state,
                Err(error) => {
                    warn!(%error, rows = trace.len(), "fixed-step run aborted");
                    return Err(Failure::new(error, trace));
                }
            };
            let row = FixedRow {
                x: state.x,
                y: state.y,
                analytic: analytic.map(|u| u(state.x)),
            };
            let flag = solout.solout(&row);
            trace.record(row);
            if flag == ControlFlag::Interrupt {
                let error = Error::Interrupted { x: state.x };
                warn!(%error, rows = trace.len(), "fixed-step run aborted");
                return Err(Failure::new(error, trace));
            }
        }

        info!(
            steps = trace.len(),
            x = trace.last().map_or(initial.x, |r| r.x),
            "fixed-step run finished"
        );
        Ok(trace)
    }
}

/// Iterator returned by [`FixedStepIntegrator::run`].
pub struct FixedSteps<'r, F: ?Sized, const N: usize> {
    evaluator: StageEvaluator<'r>,
    f: &'r F,
    state: State<N>,
    h: Float,
    x_max: Float,
    max_steps: usize,
    settings: &'r FixedSettings,
    steps: usize,
    started: Instant,
    done: bool,
}

impl<F: ?Sized, const N: usize> FixedSteps<'_, F, N> {
    /// State after the last yielded step.
    pub fn state(&self) -> State<N> {
        self.state
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn stop(&mut self, error: Error) -> Option<Result<State<N>, Error>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<F, const N: usize> Iterator for FixedSteps<'_, F, N>
where
    F: ODE<N> + ?Sized,
{
    type Item = Result<State<N>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let x = self.state.x;
        if reached(x, self.x_max, self.settings.epsilon_border) {
            self.done = true;
            return None;
        }
        if self.steps >= self.max_steps {
            return self.stop(Error::StepLimitExceeded {
                steps: self.steps,
                x,
                x_max: self.x_max,
            });
        }
        if let Some(budget) = self.settings.time_budget {
            if self.started.elapsed() >= budget {
                return self.stop(Error::TimeBudgetExceeded {
                    budget_ms: budget.as_millis(),
                    x,
                });
            }
        }

        // Last step lands on x_max
        let h = self.h.min(self.x_max - x);
        if h < self.h {
            debug!(x, h, "final step clamped to x_max");
        }

        match self.evaluator.evaluate_step(&self.state, h, self.f) {
            Ok(result) => {
                self.state = result.state;
                self.steps += 1;
                Some(Ok(result.state))
            }
            Err(error) => self.stop(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn decay(_x: Float, y: &[Float; 1]) -> [Float; 1] {
        [-y[0]]
    }

    #[test]
    fn grid_is_uniform_and_last_step_is_clamped() {
        let t = Tableau::rk4();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let xs: Vec<Float> = integrator
            .run(&decay, State::scalar(0.0, 1.0), 0.3, 1.0, 100)
            .unwrap()
            .map(|s| s.unwrap().x)
            .collect();
        assert_eq!(xs.len(), 4);
        assert_abs_diff_eq!(xs[0], 0.3, epsilon = 1e-15);
        assert_abs_diff_eq!(xs[2], 0.9, epsilon = 1e-15);
        assert_abs_diff_eq!(xs[3], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn run_is_lazy_and_restartable() {
        let t = Tableau::heun();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let calls = std::cell::Cell::new(0);
        let rhs = |_x: Float, y: &[Float; 1]| {
            calls.set(calls.get() + 1);
            [y[0]]
        };

        let mut steps = integrator.run(&rhs, State::scalar(0.0, 1.0), 0.1, 1.0, 100).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(steps.steps(), 0);
        assert_eq!(steps.state(), State::scalar(0.0, 1.0));
        let first = steps.next().unwrap().unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(steps.steps(), 1);
        assert_eq!(steps.state(), first);

        let again = integrator
            .run(&rhs, State::scalar(0.0, 1.0), 0.1, 1.0, 100)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn step_limit_is_reported_once() {
        let t = Tableau::euler();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let items: Vec<_> = integrator
            .run(&decay, State::scalar(0.0, 1.0), 0.1, 1.0, 3)
            .unwrap()
            .collect();
        assert_eq!(items.len(), 4);
        assert!(items[..3].iter().all(Result::is_ok));
        assert!(matches!(
            items[3],
            Err(Error::StepLimitExceeded { steps: 3, .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected_before_stepping() {
        let t = Tableau::euler();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let err = integrator
            .integrate(&decay, State::scalar(0.0, 1.0), 0.0, 1.0, 10)
            .unwrap_err();
        assert_eq!(err.error, Error::InvalidStepSize(0.0));
        assert!(err.partial.is_empty());
    }

    #[test]
    fn observer_can_interrupt() {
        let t = Tableau::rk4();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let mut seen = 0;
        let mut stop_after_two = |_row: &FixedRow<1>| {
            seen += 1;
            if seen == 2 {
                ControlFlag::Interrupt
            } else {
                ControlFlag::Continue
            }
        };
        let failure = integrator
            .integrate_with(
                &decay,
                State::scalar(0.0, 1.0),
                0.1,
                1.0,
                100,
                None,
                &mut stop_after_two,
            )
            .unwrap_err();
        assert_eq!(failure.partial.len(), 2);
        assert!(matches!(failure.error, Error::Interrupted { .. }));
    }

    #[test]
    fn analytic_annotation() {
        let t = Tableau::rk4();
        let integrator = FixedStepIntegrator::new(&t, FixedSettings::default());
        let exact = |x: Float| [(-x).exp()];
        let trace = integrator
            .integrate_with(
                &decay,
                State::scalar(0.0, 1.0),
                0.05,
                1.0,
                100,
                Some(&exact),
                &mut DummySolOut,
            )
            .unwrap();
        let worst = trace.summary(1.0).max_absolute_error.unwrap();
        assert!(worst < 1e-7, "worst = {worst}");
    }
}
