//! Integration state `(x, y)`.

use crate::Float;

/// Point on a solution curve: abscissa `x` and the `N` dependent values.
///
/// A value type; every accepted step produces a new `State` instead of
/// mutating the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State<const N: usize> {
    pub x: Float,
    pub y: [Float; N],
}

impl<const N: usize> State<N> {
    pub fn new(x: Float, y: [Float; N]) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.iter().all(|v| v.is_finite())
    }
}

impl State<1> {
    /// Scalar state `(x, y)`.
    pub fn scalar(x: Float, y: Float) -> Self {
        Self { x, y: [y] }
    }
}

impl State<2> {
    /// System state `(x, y1, y2)` with `y2 = dy1/dx`.
    pub fn system(x: Float, y1: Float, y2: Float) -> Self {
        Self { x, y: [y1, y2] }
    }
}

impl<const N: usize> From<(Float, [Float; N])> for State<N> {
    fn from((x, y): (Float, [Float; N])) -> Self {
        Self { x, y }
    }
}

impl From<(Float, Float)> for State<1> {
    fn from((x, y): (Float, Float)) -> Self {
        Self::scalar(x, y)
    }
}
