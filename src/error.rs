//! Errors for integration methods

use std::fmt;

use crate::Float;

/// Everything that can stop a run or refuse to start one.
///
/// Variants are grouped by [`ErrorKind`]; callers that only care about the
/// category should match on [`Error::kind`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("malformed tableau: {0}")]
    MalformedTableau(String),
    #[error("right-hand side is not finite at x = {x} (stage {stage})")]
    NonFiniteDerivative { x: Float, stage: usize },
    #[error("step size collapsed to h = {h} at x = {x} after {halvings} consecutive halvings")]
    StepSizeCollapsed { x: Float, h: Float, halvings: usize },
    #[error("x_max = {x_max} not reached within {steps} steps (stopped at x = {x})")]
    StepLimitExceeded { steps: usize, x: Float, x_max: Float },
    #[error("time budget of {budget_ms} ms exhausted at x = {x}")]
    TimeBudgetExceeded { budget_ms: u128, x: Float },
    #[error("integration interrupted by observer at x = {x}")]
    Interrupted { x: Float },
    #[error("step size must be positive and finite (got {0})")]
    InvalidStepSize(Float),
    #[error("tolerance must be positive (got {0})")]
    InvalidTolerance(Float),
    #[error("x_max must be greater than x0 (got x0 = {x0}, x_max = {x_max})")]
    InvalidInterval { x0: Float, x_max: Float },
    #[error("epsilon_border must be non-negative and finite (got {0})")]
    InvalidEpsilonBorder(Float),
    #[error("max_steps must be positive (got {0})")]
    NMaxMustBePositive(usize),
    #[error("doubling_divisor must be at least 1 (got {0})")]
    InvalidDoublingDivisor(Float),
}

/// Coarse error categories seen by presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedTableau,
    NonFiniteDerivative,
    StepSizeCollapsed,
    StepLimitExceeded,
    InvalidParameters,
    Interrupted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedTableau(_) => ErrorKind::MalformedTableau,
            Error::NonFiniteDerivative { .. } => ErrorKind::NonFiniteDerivative,
            Error::StepSizeCollapsed { .. } => ErrorKind::StepSizeCollapsed,
            Error::StepLimitExceeded { .. } | Error::TimeBudgetExceeded { .. } => {
                ErrorKind::StepLimitExceeded
            }
            Error::Interrupted { .. } => ErrorKind::Interrupted,
            Error::InvalidStepSize(_)
            | Error::InvalidTolerance(_)
            | Error::InvalidInterval { .. }
            | Error::InvalidEpsilonBorder(_)
            | Error::NMaxMustBePositive(_)
            | Error::InvalidDoublingDivisor(_) => ErrorKind::InvalidParameters,
        }
    }

    /// Whether the run stopped on a condition the caller can fix by
    /// re-running with a larger budget.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StepLimitExceeded | ErrorKind::Interrupted
        )
    }
}

/// A failed run: the error together with every row accepted before it.
#[derive(Debug, Clone)]
pub struct Failure<T> {
    pub error: Error,
    pub partial: T,
}

impl<T> Failure<T> {
    pub fn new(error: Error, partial: T) -> Self {
        Self { error, partial }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Transform the partial result, keeping the error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Failure<U> {
        Failure {
            error: self.error,
            partial: f(self.partial),
        }
    }
}

impl<T> fmt::Display for Failure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<T: fmt::Debug> std::error::Error for Failure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tagged result of a run: the full trace, or the error with a partial trace.
pub type Outcome<T> = Result<T, Failure<T>>;
