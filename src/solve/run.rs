//! Entry point dispatching a [`RunConfig`] to the matching integrator.

use tracing::debug;

use crate::{
    core::{ode::ODE, solout::DummySolOut},
    error::Outcome,
    methods::{
        adaptive::AdaptiveController,
        fixed::{Analytic, FixedStepIntegrator},
    },
    solve::{options::RunConfig, solution::RunTrace},
};

/// Integrate the problem described by `config`.
///
/// Fixed-step and adaptive runs alike return their trace on success; on
/// failure the [`Failure`](crate::Failure) carries the rows accepted before
/// the error.
pub fn run<F, const N: usize>(config: &RunConfig<F, N>) -> Outcome<RunTrace<N>>
where
    F: ODE<N>,
{
    let analytic: Option<Analytic<'_, N>> =
        config.analytic.as_deref().map(|u| u as Analytic<'_, N>);
    debug!(
        adaptive = config.adaptive,
        stages = config.tableau.stage_count(),
        order = config.tableau.order(),
        x0 = config.initial.x,
        x_max = config.x_max,
        h0 = config.h0,
        "starting run"
    );

    if config.adaptive {
        AdaptiveController::new(&config.tableau, config.adaptive_settings())
            .run_with(
                &config.rhs,
                config.initial,
                config.h0,
                config.x_max,
                analytic,
                &mut DummySolOut,
            )
            .map(RunTrace::Adaptive)
            .map_err(|failure| failure.map(RunTrace::Adaptive))
    } else {
        FixedStepIntegrator::new(&config.tableau, config.fixed_settings())
            .integrate_with(
                &config.rhs,
                config.initial,
                config.h0,
                config.x_max,
                config.max_steps,
                analytic,
                &mut DummySolOut,
            )
            .map(RunTrace::Fixed)
            .map_err(|failure| failure.map(RunTrace::Fixed))
    }
}

impl<F, const N: usize> RunConfig<F, N>
where
    F: ODE<N>,
{
    /// Shorthand for [`run`]`(self)`.
    pub fn run(&self) -> Outcome<RunTrace<N>> {
        run(self)
    }
}
