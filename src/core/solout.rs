//! User defined callback hook executed after each accepted step.

/// Return flags for [`SolOut`].
///
/// - `Continue`: proceed with integration as normal.
/// - `Interrupt`: stop integration and return control to the caller. The row
///   that was just observed is still recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlag {
    Continue,
    Interrupt,
}

/// Callback hook executed once per accepted row, before the row is handed to
/// the recorder.
///
/// Typical uses are streaming rows to a table or plot while the run is still
/// in progress, or cancelling a long run from another part of the program.
///
/// # Example
///
/// ```
/// use rkdoubling::prelude::*;
///
/// /// Stop as soon as the solution leaves the band [-10, 10].
/// struct Band;
///
/// impl SolOut<FixedRow<1>> for Band {
///     fn solout(&mut self, row: &FixedRow<1>) -> ControlFlag {
///         if row.y[0].abs() > 10.0 {
///             ControlFlag::Interrupt
///         } else {
///             ControlFlag::Continue
///         }
///     }
/// }
/// ```
pub trait SolOut<R> {
    fn solout(&mut self, row: &R) -> ControlFlag;
}

/// Observer that never interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummySolOut;

impl<R> SolOut<R> for DummySolOut {
    fn solout(&mut self, _row: &R) -> ControlFlag {
        ControlFlag::Continue
    }
}

impl<R, F> SolOut<R> for F
where
    F: FnMut(&R) -> ControlFlag,
{
    fn solout(&mut self, row: &R) -> ControlFlag {
        self(row)
    }
}
