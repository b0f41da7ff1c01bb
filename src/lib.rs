//! Explicit Runge-Kutta integration of scalar and two-component ODEs.
//!
//! Every method is a [`Tableau`](methods::tableau::Tableau) value. Integration
//! runs either on a fixed grid ([`FixedStepIntegrator`](methods::fixed::FixedStepIntegrator))
//! or under step-doubling control ([`AdaptiveController`](methods::adaptive::AdaptiveController)),
//! which compares one full step against two half steps and halves or doubles
//! the step size accordingly. Both produce an ordered [`Trace`](core::trace::Trace)
//! of rows whose column layout is stable for downstream table and plot consumers.

pub mod core;
pub mod error;
pub mod methods;
pub mod prelude;
pub mod problems;
pub mod solve;

#[cfg(feature = "python")]
mod python;

pub use error::{Error, ErrorKind, Failure};

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

/// Change this to f128, f64, f32 as desired.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
