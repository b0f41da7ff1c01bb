//! Step-doubling step-size control.
//!
//! Every step is computed twice: once with the full step `h` and once as two
//! steps of `h / 2`. Runge's rule turns the difference into a local error
//! estimate
//!
//! ```text
//! E = |y_full - y_half| / (2^p - 1)
//! ```
//!
//! and the controller reacts with a simple hysteresis: a step is rejected and
//! retried with `h / 2` while `E > tolerance`, and the next step is doubled
//! only when `E < tolerance / doubling_divisor`.

use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::{
    Float,
    core::{
        ode::ODE,
        row::AdaptiveRecord,
        solout::{ControlFlag, DummySolOut, SolOut},
        state::State,
        status::ControllerState,
        trace::Trace,
    },
    error::{Error, Failure, Outcome},
    methods::{
        fixed::Analytic,
        settings::{AdaptiveSettings, Propagation, first_error, reached, validate_run},
        stage::StageEvaluator,
        tableau::Tableau,
    },
};

pub type AdaptiveOutcome<const N: usize> = Outcome<Trace<AdaptiveRecord<N>>>;

/// Adaptive integrator driven by the step-doubling error estimate.
#[derive(Debug, Clone)]
pub struct AdaptiveController<'a> {
    evaluator: StageEvaluator<'a>,
    settings: AdaptiveSettings,
}

/// Result of one trial step, before the controller decides on it.
struct Trial<const N: usize> {
    x_new: Float,
    y_full: [Float; N],
    y_half: [Float; N],
    component_errors: [Float; N],
    error: Float,
}

impl<'a> AdaptiveController<'a> {
    pub fn new(tableau: &'a Tableau, settings: AdaptiveSettings) -> Self {
        Self {
            evaluator: StageEvaluator::new(tableau),
            settings,
        }
    }

    pub fn settings(&self) -> &AdaptiveSettings {
        &self.settings
    }

    /// Integrate from `initial` to `x_max` starting with step size `h0`.
    pub fn run<F, const N: usize>(
        &self,
        f: &F,
        initial: State<N>,
        h0: Float,
        x_max: Float,
    ) -> AdaptiveOutcome<N>
    where
        F: ODE<N> + ?Sized,
    {
        self.run_with(f, initial, h0, x_max, None, &mut DummySolOut)
    }

    /// Like [`run`](Self::run), additionally annotating each record with
    /// `analytic(x)` and showing it to `solout` before it is recorded.
    pub fn run_with<F, S, const N: usize>(
        &self,
        f: &F,
        initial: State<N>,
        h0: Float,
        x_max: Float,
        analytic: Option<Analytic<'_, N>>,
        solout: &mut S,
    ) -> AdaptiveOutcome<N>
    where
        F: ODE<N> + ?Sized,
        S: SolOut<AdaptiveRecord<N>>,
    {
        let settings = &self.settings;
        let mut trace = Trace::new();

        // --- Input Validation ---
        let mut errors = validate_run(
            initial.x,
            x_max,
            h0,
            settings.max_steps,
            settings.epsilon_border,
        );
        errors.extend(settings.validate());
        if let Err(error) = first_error(errors) {
            return Err(Failure::new(error, trace));
        }

        // --- Declarations ---
        let adapts = settings.adapts();
        let started = Instant::now();
        let mut state = initial;
        let mut h = h0;
        let mut halvings = 0;
        let mut doublings = 0;
        let mut machine;

        let abort = |error: Error, trace: Trace<AdaptiveRecord<N>>| -> AdaptiveOutcome<N> {
            warn!(%error, rows = trace.len(), "adaptive run aborted");
            Err(Failure::new(error, trace))
        };

        // --- Main integration loop ---
        loop {
            if reached(state.x, x_max, settings.epsilon_border) {
                machine = ControllerState::Terminated;
                info!(
                    steps = trace.len(),
                    x = state.x,
                    halvings,
                    doublings,
                    ?machine,
                    "adaptive run finished"
                );
                return Ok(trace);
            }
            if trace.len() >= settings.max_steps {
                let error = Error::StepLimitExceeded {
                    steps: trace.len(),
                    x: state.x,
                    x_max,
                };
                return abort(error, trace);
            }
            if let Some(budget) = settings.time_budget {
                if started.elapsed() >= budget {
                    let error = Error::TimeBudgetExceeded {
                        budget_ms: budget.as_millis(),
                        x: state.x,
                    };
                    return abort(error, trace);
                }
            }

            machine = ControllerState::Stepping;
            // The clamp applies to this step only
            let mut h_step = h.min(x_max - state.x);
            let mut rejected = 0;
            trace!(x = state.x, h = h_step, ?machine, "trial step");

            let trial = loop {
                let trial = match self.trial(f, &state, h_step) {
                    Ok(trial) => trial,
                    Err(error) => return abort(error, trace),
                };
                if !adapts || trial.error <= settings.tolerance {
                    break trial;
                }

                machine = ControllerState::Halving;
                rejected += 1;
                halvings += 1;
                h_step /= 2.0;
                debug!(x = state.x, h = h_step, error = trial.error, ?machine, "step rejected");
                if rejected > settings.max_halvings || state.x + h_step <= state.x {
                    let error = Error::StepSizeCollapsed {
                        x: state.x,
                        h: h_step,
                        halvings: rejected,
                    };
                    return abort(error, trace);
                }
            };
            if rejected > 0 {
                h = h_step;
            }

            let doubled = adapts
                && trial.error < settings.tolerance / settings.doubling_divisor
                && trial.x_new + 2.0 * h <= x_max;
            if doubled {
                h *= 2.0;
                doublings += 1;
                machine = ControllerState::Doubling;
                debug!(x = trial.x_new, h, error = trial.error, ?machine, "step doubled");
            } else {
                machine = ControllerState::ConvergedStep;
            }
            debug_assert!(machine.is_accepting());

            let accepted = match settings.propagation {
                Propagation::HalfSteps => trial.y_half,
                Propagation::FullStep => trial.y_full,
            };
            let record = AdaptiveRecord {
                x: trial.x_new,
                y_full: trial.y_full,
                y_half: trial.y_half,
                accepted,
                error: trial.error,
                component_errors: trial.component_errors,
                h: h_step,
                halvings,
                doublings,
                halved: rejected > 0,
                doubled,
                analytic: analytic.map(|u| u(trial.x_new)),
            };
            state = State::new(trial.x_new, accepted);

            let flag = solout.solout(&record);
            trace.record(record);
            if flag == ControlFlag::Interrupt {
                return abort(Error::Interrupted { x: state.x }, trace);
            }
        }
    }

    /// One full step and two half steps from `state`, plus the error estimate.
    fn trial<F, const N: usize>(
        &self,
        f: &F,
        state: &State<N>,
        h: Float,
    ) -> Result<Trial<N>, Error>
    where
        F: ODE<N> + ?Sized,
    {
        let full = self.evaluator.evaluate_step(state, h, f)?;
        let mid = self.evaluator.evaluate_step(state, h / 2.0, f)?;
        let half = self.evaluator.evaluate_step(&mid.state, h / 2.0, f)?;

        let denominator = self.evaluator.tableau().runge_denominator();
        let component_errors: [Float; N] = std::array::from_fn(|c| {
            (full.state.y[c] - half.state.y[c]).abs() / denominator
        });
        let error = self.settings.error_norm.combine(&component_errors);

        Ok(Trial {
            x_new: full.state.x,
            y_full: full.state.y,
            y_half: half.state.y,
            component_errors,
            error,
        })
    }
}
