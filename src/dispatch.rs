//! Dispatch lifecycle shared by remote submission and local download

use crate::error::{Error, Result};
use crate::types::DispatchState;

/// Tracks one report from build to completion
///
/// `Idle -> Building -> Dispatching -> Done`, with `Failed` reachable from
/// `Building` and `Dispatching`. Terminal states never transition again.
#[derive(Debug, Clone)]
pub struct DispatchStateMachine {
    state: DispatchState,
    failure: Option<String>,
}

impl Default for DispatchStateMachine {
    fn default() -> Self {
        Self {
            state: DispatchState::Idle,
            failure: None,
        }
    }
}

impl DispatchStateMachine {
    /// Current state
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Cause of failure, once in `Failed`
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Idle -> Building
    pub fn start_building(&mut self) -> Result<DispatchState> {
        self.transition(DispatchState::Idle, DispatchState::Building, "start building")
    }

    /// Building -> Dispatching
    pub fn start_dispatching(&mut self) -> Result<DispatchState> {
        self.transition(
            DispatchState::Building,
            DispatchState::Dispatching,
            "dispatch",
        )
    }

    /// Dispatching -> Done
    pub fn finish(&mut self) -> Result<DispatchState> {
        self.transition(DispatchState::Dispatching, DispatchState::Done, "finish")
    }

    /// Building | Dispatching -> Failed
    pub fn fail(&mut self, cause: impl Into<String>) -> Result<DispatchState> {
        match self.state {
            DispatchState::Building | DispatchState::Dispatching => {
                self.state = DispatchState::Failed;
                self.failure = Some(cause.into());
                Ok(self.state)
            }
            state => Err(invalid_state(state, "fail")),
        }
    }

    fn transition(
        &mut self,
        expected: DispatchState,
        next: DispatchState,
        action: &str,
    ) -> Result<DispatchState> {
        if self.state != expected {
            return Err(invalid_state(self.state, action));
        }
        self.state = next;
        Ok(next)
    }
}

fn invalid_state(state: DispatchState, action: &str) -> Error {
    Error::InvalidState {
        action: action.to_string(),
        state: state.to_string(),
    }
}
