//! Ordered record of a run, handed to tables, plots and CSV writers.

use serde::{Deserialize, Serialize};

use crate::{
    Float,
    core::row::{AdaptiveRecord, FixedRow, Row},
};

/// Append-only sequence of rows in emission order.
///
/// Both integrators fill a `Trace` as they go and return it whether the run
/// succeeded or failed, so a caller can always inspect how far it got.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<R> {
    rows: Vec<R>,
}

impl<R> Default for Trace<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> Trace<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Rows already recorded are never touched again.
    pub fn record(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&R> {
        self.rows.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R: Row> Trace<R> {
    /// Column names of the rows, empty for an empty trace.
    pub fn labels(&self) -> Vec<String> {
        self.rows.first().map(Row::labels).unwrap_or_default()
    }

    /// Row-major positional table, one inner `Vec` per row.
    pub fn to_table(&self) -> Vec<Vec<Float>> {
        self.rows.iter().map(Row::values).collect()
    }

    /// Abscissae of all rows.
    pub fn xs(&self) -> Vec<Float> {
        self.rows.iter().map(Row::x).collect()
    }

    fn max_absolute_error(&self) -> Option<Float> {
        self.rows
            .iter()
            .filter_map(Row::absolute_error)
            .flatten()
            .reduce(Float::max)
    }

    fn base_summary(&self, x_max: Float) -> TraceSummary {
        let final_x = self.rows.last().map(Row::x);
        TraceSummary {
            steps: self.rows.len(),
            final_x,
            distance_to_border: final_x.map(|x| (x_max - x).abs()),
            max_absolute_error: self.max_absolute_error(),
            ..TraceSummary::default()
        }
    }
}

impl<R> IntoIterator for Trace<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Trace<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<R> FromIterator<R> for Trace<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Step size together with the abscissa at which it was used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepAt {
    pub h: Float,
    pub x: Float,
}

/// Post-run report over a trace.
///
/// Fields that only make sense for adaptive runs stay `None` (or zero) for
/// fixed-step traces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Number of recorded rows.
    pub steps: usize,
    pub final_x: Option<Float>,
    /// `|x_max - final_x|`.
    pub distance_to_border: Option<Float>,
    /// Largest local error estimate `E`.
    pub max_error: Option<Float>,
    /// Total halvings (c1) over the run.
    pub halvings: usize,
    /// Total doublings (c2) over the run.
    pub doublings: usize,
    pub max_step: Option<StepAt>,
    pub min_step: Option<StepAt>,
    /// Largest `|analytic - numeric|` over all rows and components.
    pub max_absolute_error: Option<Float>,
}

impl<const N: usize> Trace<FixedRow<N>> {
    pub fn summary(&self, x_max: Float) -> TraceSummary {
        self.base_summary(x_max)
    }
}

impl<const N: usize> Trace<AdaptiveRecord<N>> {
    pub fn summary(&self, x_max: Float) -> TraceSummary {
        let steps_at = self.rows.iter().map(|r| StepAt { h: r.h, x: r.x });
        let (halvings, doublings) = self
            .rows
            .last()
            .map_or((0, 0), |r| (r.halvings, r.doublings));
        TraceSummary {
            max_error: self.rows.iter().map(|r| r.error).reduce(Float::max),
            halvings,
            doublings,
            max_step: steps_at.clone().reduce(|a, b| if b.h > a.h { b } else { a }),
            min_step: steps_at.reduce(|a, b| if b.h < a.h { b } else { a }),
            ..self.base_summary(x_max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x: Float, h: Float, error: Float, halvings: usize, doublings: usize) -> AdaptiveRecord<1> {
        AdaptiveRecord {
            x,
            y_full: [1.0],
            y_half: [1.0],
            accepted: [1.0],
            error,
            component_errors: [error],
            h,
            halvings,
            doublings,
            halved: false,
            doubled: false,
            analytic: Some([1.5]),
        }
    }

    #[test]
    fn summary_reports_extremes_and_counters() {
        let trace: Trace<_> = [
            record(0.1, 0.1, 1e-8, 0, 1),
            record(0.3, 0.2, 3e-8, 2, 1),
            record(0.35, 0.05, 2e-8, 4, 2),
        ]
        .into_iter()
        .collect();

        let s = trace.summary(0.4);
        assert_eq!(s.steps, 3);
        assert_eq!(s.final_x, Some(0.35));
        assert!((s.distance_to_border.unwrap() - 0.05).abs() < 1e-15);
        assert_eq!(s.max_error, Some(3e-8));
        assert_eq!((s.halvings, s.doublings), (4, 2));
        assert_eq!(s.max_step, Some(StepAt { h: 0.2, x: 0.3 }));
        assert_eq!(s.min_step, Some(StepAt { h: 0.05, x: 0.35 }));
        assert_eq!(s.max_absolute_error, Some(0.5));
    }

    #[test]
    fn empty_trace_summary() {
        let trace = Trace::<FixedRow<2>>::new();
        let s = trace.summary(1.0);
        assert_eq!(s, TraceSummary::default());
        assert!(trace.labels().is_empty());
    }

    #[test]
    fn table_matches_labels() {
        let mut trace = Trace::new();
        trace.record(FixedRow { x: 0.0, y: [1.0, 0.0], analytic: None });
        trace.record(FixedRow { x: 0.1, y: [0.9, -0.1], analytic: None });
        let labels = trace.labels();
        for row in trace.to_table() {
            assert_eq!(row.len(), labels.len());
        }
        assert_eq!(trace.xs(), vec![0.0, 0.1]);
    }
}
