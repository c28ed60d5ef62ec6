use tracing::trace;

use crate::dispatch::DispatchError;

/// Lifecycle of one dispatch operation.
///
/// ```text
/// Idle -> Dispatching -> AllSucceeded -> Assembling -> Done
///                     \-> AnyFailed -> Aborting -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Dispatching,
    AllSucceeded,
    Assembling,
    Done,
    AnyFailed,
    Aborting,
    Failed,
}

impl DispatchState {
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (Idle, Dispatching)
                | (Dispatching, AllSucceeded)
                | (Dispatching, AnyFailed)
                | (AllSucceeded, Assembling)
                | (Assembling, Done)
                | (AnyFailed, Aborting)
                | (Aborting, Failed)
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: DispatchState) -> Result<(), DispatchError> {
        if !self.can_transition_to(next) {
            return Err(DispatchError::IllegalTransition { from: *self, to: next });
        }
        trace!(from = ?*self, to = ?next, "dispatch state");
        *self = next;
        Ok(())
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DispatchState::Done | DispatchState::Failed)
    }
}
