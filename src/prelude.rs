//! Convenient prelude: import the most commonly used traits, types, and functions.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use rkdoubling::prelude::*;
//! ```
//!
//! Re-exports included:
//! - Core traits and types: `ODE`, `State`, `SolOut`, `ControlFlag`, `Row`, `FixedRow`,
//!   `AdaptiveRecord`, `Trace`, `TraceSummary`.
//! - Methods: `Tableau`, `FixedStepIntegrator`, `AdaptiveController` and their settings.
//! - High-level API: `run`, `RunConfig`, `RunTrace`.
//!

pub use crate::core::{
    ode::ODE,
    row::{AdaptiveRecord, FixedRow, Row},
    solout::{ControlFlag, DummySolOut, SolOut},
    state::State,
    status::ControllerState,
    trace::{StepAt, Trace, TraceSummary},
};
pub use crate::error::{Error, ErrorKind, Failure, Outcome};
pub use crate::methods::{
    adaptive::AdaptiveController,
    fixed::FixedStepIntegrator,
    settings::{AdaptiveSettings, ErrorNorm, FixedSettings, Propagation},
    tableau::Tableau,
};
pub use crate::solve::{RunConfig, RunTrace, run};
