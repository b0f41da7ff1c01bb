//! Settings for the numerical integrators

use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Float, error::Error};

/// How per-component error estimates of a system are combined into `E`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorNorm {
    /// Largest component.
    #[default]
    Max,
    /// `sqrt(sum of squares)`.
    Euclidean,
}

impl ErrorNorm {
    pub fn combine(self, components: &[Float]) -> Float {
        match self {
            ErrorNorm::Max => components.iter().copied().fold(0.0, Float::max),
            ErrorNorm::Euclidean => components.iter().map(|e| e * e).sum::<Float>().sqrt(),
        }
    }
}

/// Which of the two candidate values an accepted adaptive step continues from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Propagation {
    /// The result of two half steps (the more accurate one).
    #[default]
    HalfSteps,
    /// The result of the single full step.
    FullStep,
}

#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Settings for the fixed-step integrator
pub struct FixedSettings {
    /// The run ends once `x_max - x <= epsilon_border`. Default is 1e-6.
    #[builder(default = 1e-6)]
    pub epsilon_border: Float,
    /// Optional wall-clock budget, checked once per step.
    pub time_budget: Option<Duration>,
}

impl Default for FixedSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Settings for the step-doubling controller
pub struct AdaptiveSettings {
    /// Largest accepted local error estimate `E`. A non-finite tolerance
    /// turns adaptation off.
    pub tolerance: Float,
    /// The run ends once `|x - x_max| <= epsilon_border`. Default is 1e-6.
    #[builder(default = 1e-6)]
    pub epsilon_border: Float,
    /// Maximum number of accepted steps. Default is 100,000.
    #[builder(default = 100_000)]
    pub max_steps: usize,
    /// The step size is doubled when `E < tolerance / doubling_divisor`.
    /// Default is 64.
    #[builder(default = 64.0)]
    pub doubling_divisor: Float,
    /// Consecutive rejections of one step before the run gives up.
    /// Default is 60.
    #[builder(default = 60)]
    pub max_halvings: usize,
    #[builder(default)]
    pub error_norm: ErrorNorm,
    #[builder(default)]
    pub propagation: Propagation,
    /// Optional wall-clock budget, checked once per accepted step.
    pub time_budget: Option<Duration>,
}

impl AdaptiveSettings {
    pub fn new(tolerance: Float) -> Self {
        Self::builder().tolerance(tolerance).build()
    }

    /// Whether the controller halves and doubles at all.
    pub fn adapts(&self) -> bool {
        self.tolerance.is_finite()
    }

    pub(crate) fn validate(&self) -> Vec<Error> {
        let mut errors = Vec::new();
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            errors.push(Error::InvalidTolerance(self.tolerance));
        }
        if self.max_steps == 0 {
            errors.push(Error::NMaxMustBePositive(self.max_steps));
        }
        if !(self.doubling_divisor >= 1.0) {
            errors.push(Error::InvalidDoublingDivisor(self.doubling_divisor));
        }
        errors
    }
}

/// Checks shared by both integrators, run before any stepping.
pub(crate) fn validate_run(
    x0: Float,
    x_max: Float,
    h: Float,
    max_steps: usize,
    epsilon_border: Float,
) -> Vec<Error> {
    let mut errors = Vec::new();
    if !(h.is_finite() && h > 0.0) {
        errors.push(Error::InvalidStepSize(h));
    }
    if !(x0.is_finite() && x_max.is_finite() && x_max > x0) {
        errors.push(Error::InvalidInterval { x0, x_max });
    }
    if max_steps == 0 {
        errors.push(Error::NMaxMustBePositive(max_steps));
    }
    if !(epsilon_border.is_finite() && epsilon_border >= 0.0) {
        errors.push(Error::InvalidEpsilonBorder(epsilon_border));
    }
    errors
}

/// Reduce collected validation errors to the first one, logging the rest.
pub(crate) fn first_error(errors: Vec<Error>) -> Result<(), Error> {
    let mut errors = errors.into_iter();
    match errors.next() {
        None => Ok(()),
        Some(first) => {
            for other in errors {
                warn!(%other, "additional invalid parameter");
            }
            Err(first)
        }
    }
}

/// Whether `x` is close enough to `x_max` to end the run.
pub(crate) fn reached(x: Float, x_max: Float, epsilon_border: Float) -> bool {
    x >= x_max || x_max - x <= epsilon_border
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = AdaptiveSettings::new(1e-6);
        assert_eq!(s.epsilon_border, 1e-6);
        assert_eq!(s.doubling_divisor, 64.0);
        assert_eq!(s.error_norm, ErrorNorm::Max);
        assert_eq!(s.propagation, Propagation::HalfSteps);
        assert!(s.adapts());
        assert!(s.validate().is_empty());
        assert!(!AdaptiveSettings::new(Float::INFINITY).adapts());
    }

    #[test]
    fn invalid_adaptive_settings_are_all_collected() {
        let s = AdaptiveSettings::builder()
            .tolerance(0.0)
            .max_steps(0)
            .doubling_divisor(0.5)
            .build();
        assert_eq!(
            s.validate(),
            vec![
                Error::InvalidTolerance(0.0),
                Error::NMaxMustBePositive(0),
                Error::InvalidDoublingDivisor(0.5),
            ]
        );
    }

    #[test]
    fn run_validation() {
        assert!(validate_run(0.0, 1.0, 0.1, 10, 1e-6).is_empty());
        let errors = validate_run(1.0, 1.0, -0.1, 10, 1e-6);
        assert_eq!(
            errors,
            vec![
                Error::InvalidStepSize(-0.1),
                Error::InvalidInterval { x0: 1.0, x_max: 1.0 },
            ]
        );
        assert_eq!(first_error(errors), Err(Error::InvalidStepSize(-0.1)));
    }

    #[test]
    fn norms() {
        assert_eq!(ErrorNorm::Max.combine(&[3.0, 4.0]), 4.0);
        assert_eq!(ErrorNorm::Euclidean.combine(&[3.0, 4.0]), 5.0);
    }
}
