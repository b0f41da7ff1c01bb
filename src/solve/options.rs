//! Configuration of a single integration run

use std::{sync::Arc, time::Duration};

use bon::Builder;

use crate::{
    Float,
    core::state::State,
    methods::{
        settings::{AdaptiveSettings, ErrorNorm, FixedSettings, Propagation},
        tableau::Tableau,
    },
};

/// Exact solution attached to a run, shareable across threads.
pub type AnalyticFn<const N: usize> = Box<dyn Fn(Float) -> [Float; N] + Send + Sync>;

#[derive(Builder)]
/// Everything a run needs: method, problem, interval and controller knobs.
///
/// ```
/// use rkdoubling::prelude::*;
///
/// let config = RunConfig::builder()
///     .tableau(Tableau::heun())
///     .rhs(|_x: f64, y: &[f64; 1]| [-y[0]])
///     .initial((0.0, 1.0))
///     .h0(0.1)
///     .x_max(1.0)
///     .adaptive(true)
///     .tolerance(1e-6)
///     .build();
/// let trace = config.run().unwrap();
/// assert!(trace.len() > 0);
/// ```
pub struct RunConfig<F, const N: usize> {
    /// Method coefficients. Default: classical RK4.
    #[builder(default = Arc::new(Tableau::rk4()), into)]
    pub tableau: Arc<Tableau>,
    /// Right-hand side `y' = f(x, y)`.
    pub rhs: F,
    /// Initial point `(x0, y0)`.
    #[builder(into)]
    pub initial: State<N>,
    /// Step size, or the initial step size of an adaptive run.
    pub h0: Float,
    pub x_max: Float,
    /// Default: 1e-6.
    #[builder(default = 1e-6)]
    pub epsilon_border: Float,
    /// Maximum number of (accepted) steps. Default: 100,000.
    #[builder(default = 100_000)]
    pub max_steps: usize,
    /// Use step-doubling control instead of a fixed grid. Default: false.
    #[builder(default = false)]
    pub adaptive: bool,
    /// Required when `adaptive` is set.
    pub tolerance: Option<Float>,
    /// Exact solution, recorded next to every row when given.
    pub analytic: Option<AnalyticFn<N>>,
    /// Default: 64.
    #[builder(default = 64.0)]
    pub doubling_divisor: Float,
    /// Default: 60.
    #[builder(default = 60)]
    pub max_halvings: usize,
    #[builder(default)]
    pub error_norm: ErrorNorm,
    #[builder(default)]
    pub propagation: Propagation,
    pub time_budget: Option<Duration>,
}

impl<F, const N: usize> RunConfig<F, N> {
    pub fn fixed_settings(&self) -> FixedSettings {
        FixedSettings {
            epsilon_border: self.epsilon_border,
            time_budget: self.time_budget,
        }
    }

    /// A missing tolerance shows up as NaN and is rejected on validation.
    pub fn adaptive_settings(&self) -> AdaptiveSettings {
        AdaptiveSettings {
            tolerance: self.tolerance.unwrap_or(Float::NAN),
            epsilon_border: self.epsilon_border,
            max_steps: self.max_steps,
            doubling_divisor: self.doubling_divisor,
            max_halvings: self.max_halvings,
            error_norm: self.error_norm,
            propagation: self.propagation,
            time_budget: self.time_budget,
        }
    }
}
