//! Result rows and their positional column layouts.
//!
//! Downstream tables and CSV readers index columns by position, so the order
//! produced by [`Row::values`] and the names produced by [`Row::labels`] are
//! part of the public contract:
//!
//! | mode            | columns                                                          |
//! |-----------------|------------------------------------------------------------------|
//! | fixed, scalar   | `x, v[, u, \|ui-vi\|]`                                           |
//! | fixed, system   | `x, u, u'`                                                       |
//! | adaptive scalar | `x, v, v2i, v-v2i, E, h, c1, c2[, u, \|ui-vi\|]`                 |
//! | adaptive system | `x, u, u', u2i, u'2i, u-u2i, u'-u'2i, h, E, E_v, E_v', c1, c2`   |
//!
//! `v`/`u` are full-step values, `v2i`/`u2i` the values from two half steps,
//! `c1`/`c2` the cumulative halving and doubling counts. `|ui-vi|` compares
//! the exact solution with the full-step `v`; [`Row::absolute_error`] instead
//! measures the value the run carries forward.

use crate::Float;

/// A row of a trace with a fixed positional layout.
pub trait Row {
    /// Abscissa of the row.
    fn x(&self) -> Float;
    /// Column names, same length and order as [`Row::values`].
    fn labels(&self) -> Vec<String>;
    /// Column values.
    fn values(&self) -> Vec<Float>;
    /// `|analytic - numeric|` per component, when ground truth is known, for
    /// the value the run continues from.
    fn absolute_error(&self) -> Option<Vec<Float>>;
}

/// One step of a fixed-step run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRow<const N: usize> {
    pub x: Float,
    pub y: [Float; N],
    /// Exact solution at `x`, if the run was given one.
    pub analytic: Option<[Float; N]>,
}

/// One accepted step of an adaptive run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRecord<const N: usize> {
    pub x: Float,
    /// Value after one step of size `h`.
    pub y_full: [Float; N],
    /// Value after two steps of size `h / 2`.
    pub y_half: [Float; N],
    /// Value the run continues from (one of the two above).
    pub accepted: [Float; N],
    /// Runge estimate of the local error, combined over components.
    pub error: Float,
    /// Runge estimate per component.
    pub component_errors: [Float; N],
    /// Step size used for this step.
    pub h: Float,
    /// Cumulative number of halvings (c1).
    pub halvings: usize,
    /// Cumulative number of doublings (c2).
    pub doublings: usize,
    /// At least one trial of this step was rejected.
    pub halved: bool,
    /// The step after this one uses twice the step size.
    pub doubled: bool,
    pub analytic: Option<[Float; N]>,
}

impl<const N: usize> AdaptiveRecord<N> {
    /// `|y_full - y_half|` per component.
    pub fn difference(&self) -> [Float; N] {
        std::array::from_fn(|i| (self.y_full[i] - self.y_half[i]).abs())
    }
}

fn abs_diff<const N: usize>(a: &[Float; N], b: &[Float; N]) -> Vec<Float> {
    a.iter().zip(b).map(|(a, b)| (a - b).abs()).collect()
}

fn names(n: usize, pattern: impl Fn(usize) -> String) -> impl Iterator<Item = String> {
    (1..=n).map(pattern)
}

impl<const N: usize> Row for FixedRow<N> {
    fn x(&self) -> Float {
        self.x
    }

    fn labels(&self) -> Vec<String> {
        let mut labels = vec!["x".to_string()];
        match N {
            1 => labels.push("v".into()),
            2 => labels.extend([String::from("u"), String::from("u'")]),
            n => labels.extend(names(n, |i| format!("y{i}"))),
        }
        if self.analytic.is_some() {
            match N {
                1 => labels.extend([String::from("u"), String::from("|ui-vi|")]),
                n => {
                    labels.extend(names(n, |i| format!("y{i}_exact")));
                    labels.extend(names(n, |i| format!("|y{i}_exact-y{i}|")));
                }
            }
        }
        labels
    }

    fn values(&self) -> Vec<Float> {
        let mut values = Vec::with_capacity(1 + 3 * N);
        values.push(self.x);
        values.extend(self.y);
        if let Some(exact) = self.analytic {
            values.extend(exact);
            values.extend(abs_diff(&exact, &self.y));
        }
        values
    }

    fn absolute_error(&self) -> Option<Vec<Float>> {
        self.analytic.map(|exact| abs_diff(&exact, &self.y))
    }
}

impl<const N: usize> Row for AdaptiveRecord<N> {
    fn x(&self) -> Float {
        self.x
    }

    fn labels(&self) -> Vec<String> {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut labels = match N {
            1 => owned(&["x", "v", "v2i", "v-v2i", "E", "h", "c1", "c2"]),
            2 => owned(&[
                "x", "u", "u'", "u2i", "u'2i", "u-u2i", "u'-u'2i", "h", "E", "E_v", "E_v'", "c1",
                "c2",
            ]),
            n => {
                let mut labels = vec!["x".to_string()];
                labels.extend(names(n, |i| format!("y{i}")));
                labels.extend(names(n, |i| format!("y{i}_half")));
                labels.extend(names(n, |i| format!("diff{i}")));
                labels.extend(owned(&["h", "E"]));
                labels.extend(names(n, |i| format!("E{i}")));
                labels.extend(owned(&["c1", "c2"]));
                labels
            }
        };
        if self.analytic.is_some() {
            match N {
                1 => labels.extend(owned(&["u", "|ui-vi|"])),
                n => {
                    labels.extend(names(n, |i| format!("y{i}_exact")));
                    labels.extend(names(n, |i| format!("|y{i}_exact-y{i}|")));
                }
            }
        }
        labels
    }

    fn values(&self) -> Vec<Float> {
        let counts = [self.halvings as Float, self.doublings as Float];
        let mut values = Vec::with_capacity(5 * N + 6);
        values.push(self.x);
        values.extend(self.y_full);
        values.extend(self.y_half);
        values.extend(self.difference());
        if N == 1 {
            values.extend([self.error, self.h]);
        } else {
            values.extend([self.h, self.error]);
            values.extend(self.component_errors);
        }
        values.extend(counts);
        if let Some(exact) = self.analytic {
            values.extend(exact);
            values.extend(abs_diff(&exact, &self.y_full));
        }
        values
    }

    fn absolute_error(&self) -> Option<Vec<Float>> {
        self.analytic.map(|exact| abs_diff(&exact, &self.accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_record() -> AdaptiveRecord<1> {
        AdaptiveRecord {
            x: 0.1,
            y_full: [1.5],
            y_half: [1.25],
            accepted: [1.25],
            error: 0.25 / 15.0,
            component_errors: [0.25 / 15.0],
            h: 0.1,
            halvings: 3,
            doublings: 1,
            halved: true,
            doubled: false,
            analytic: Some([1.0]),
        }
    }

    #[test]
    fn scalar_adaptive_layout() {
        let r = scalar_record();
        assert_eq!(
            r.labels(),
            ["x", "v", "v2i", "v-v2i", "E", "h", "c1", "c2", "u", "|ui-vi|"]
        );
        assert_eq!(
            r.values(),
            vec![0.1, 1.5, 1.25, 0.25, 0.25 / 15.0, 0.1, 3.0, 1.0, 1.0, 0.5]
        );
        // the column is |u - v|, the summary follows the propagated value
        assert_eq!(r.absolute_error(), Some(vec![0.25]));
    }

    #[test]
    fn system_adaptive_layout() {
        let r = AdaptiveRecord::<2> {
            x: 1.0,
            y_full: [1.0, 2.0],
            y_half: [1.5, 1.0],
            accepted: [1.5, 1.0],
            error: 1.0 / 15.0,
            component_errors: [0.5 / 15.0, 1.0 / 15.0],
            h: 0.5,
            halvings: 0,
            doublings: 2,
            halved: false,
            doubled: true,
            analytic: None,
        };
        let labels = r.labels();
        let values = r.values();
        assert_eq!(labels.len(), 13);
        assert_eq!(values.len(), 13);
        assert_eq!(labels[7], "h");
        assert_eq!(values[7], 0.5);
        assert_eq!(labels[8], "E");
        assert_eq!(values[8], 1.0 / 15.0);
        assert_eq!(&values[3..7], &[1.5, 1.0, 0.5, 1.0]);
        assert_eq!(&values[11..], &[0.0, 2.0]);
        assert!(r.absolute_error().is_none());
    }

    #[test]
    fn fixed_layouts() {
        let scalar = FixedRow { x: 0.5, y: [2.0], analytic: Some([2.5]) };
        assert_eq!(scalar.labels(), ["x", "v", "u", "|ui-vi|"]);
        assert_eq!(scalar.values(), vec![0.5, 2.0, 2.5, 0.5]);

        let system = FixedRow { x: 0.5, y: [2.0, -1.0], analytic: None };
        assert_eq!(system.labels(), ["x", "u", "u'"]);
        assert_eq!(system.values(), vec![0.5, 2.0, -1.0]);
    }
}
