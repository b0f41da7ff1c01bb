//! States of the step-doubling controller.

/// State machine of [`AdaptiveController`](crate::methods::adaptive::AdaptiveController).
///
/// `Stepping` is entered at the start of every trial step. A trial ends in
/// `Halving` (rejected, retried with half the step), `Doubling` (accepted,
/// next step twice as large) or `ConvergedStep` (accepted, step unchanged).
/// `Terminated` is final and only reached on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stepping,
    Halving,
    Doubling,
    ConvergedStep,
    Terminated,
}

impl ControllerState {
    /// Whether the trial that led to this state produced an accepted row.
    pub fn is_accepting(self) -> bool {
        matches!(self, ControllerState::Doubling | ControllerState::ConvergedStep)
    }
}
