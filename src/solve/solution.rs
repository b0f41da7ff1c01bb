//! Trace returned by [`run`](crate::solve::run)

use crate::{
    Float,
    core::{
        row::{AdaptiveRecord, FixedRow},
        state::State,
        trace::{Trace, TraceSummary},
    },
};

/// Trace of either integration mode.
#[derive(Debug, Clone, PartialEq)]
pub enum RunTrace<const N: usize> {
    Fixed(Trace<FixedRow<N>>),
    Adaptive(Trace<AdaptiveRecord<N>>),
}

impl<const N: usize> RunTrace<N> {
    pub fn is_adaptive(&self) -> bool {
        matches!(self, RunTrace::Adaptive(_))
    }

    pub fn len(&self) -> usize {
        match self {
            RunTrace::Fixed(t) => t.len(),
            RunTrace::Adaptive(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            RunTrace::Fixed(t) => t.labels(),
            RunTrace::Adaptive(t) => t.labels(),
        }
    }

    pub fn to_table(&self) -> Vec<Vec<Float>> {
        match self {
            RunTrace::Fixed(t) => t.to_table(),
            RunTrace::Adaptive(t) => t.to_table(),
        }
    }

    pub fn xs(&self) -> Vec<Float> {
        match self {
            RunTrace::Fixed(t) => t.xs(),
            RunTrace::Adaptive(t) => t.xs(),
        }
    }

    pub fn summary(&self, x_max: Float) -> TraceSummary {
        match self {
            RunTrace::Fixed(t) => t.summary(x_max),
            RunTrace::Adaptive(t) => t.summary(x_max),
        }
    }

    /// State the run ended in, `None` if no step was taken.
    pub fn final_state(&self) -> Option<State<N>> {
        match self {
            RunTrace::Fixed(t) => t.last().map(|r| State::new(r.x, r.y)),
            RunTrace::Adaptive(t) => t.last().map(|r| State::new(r.x, r.accepted)),
        }
    }

    pub fn as_fixed(&self) -> Option<&Trace<FixedRow<N>>> {
        match self {
            RunTrace::Fixed(t) => Some(t),
            RunTrace::Adaptive(_) => None,
        }
    }

    pub fn as_adaptive(&self) -> Option<&Trace<AdaptiveRecord<N>>> {
        match self {
            RunTrace::Adaptive(t) => Some(t),
            RunTrace::Fixed(_) => None,
        }
    }
}
