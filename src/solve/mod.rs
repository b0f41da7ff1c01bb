//! High-level entry point: describe a run with [`RunConfig`], get a [`RunTrace`].

pub mod options;
pub mod run;
pub mod solution;

// Re-exports for ergonomic access via crate::solve::* and prelude
pub use options::{AnalyticFn, RunConfig};
pub use run::run;
pub use solution::RunTrace;
