// Controller state management

use crate::error::{PlayerError, Result};
use parking_lot::RwLock;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing prepared yet
    Idle,
    /// Media handed to the engine, waiting for the first buffer
    Preparing,
    /// Engine is filling its buffer (initial load or after a seek)
    Buffering,
    /// Engine can render; playing or paused depending on play-when-ready
    Ready,
    /// Controller released, terminal
    Released,
}

impl State {
    pub fn is_loading(self) -> bool {
        matches!(self, State::Preparing | State::Buffering)
    }
}

/// Thread-safe controller state container
pub struct StateContainer {
    state: RwLock<State>,
}

impl StateContainer {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Idle),
        }
    }

    pub fn get(&self) -> State {
        *self.state.read()
    }

    /// Move to `new_state` if the transition is legal; returns the previous state.
    pub fn transition(&self, new_state: State) -> Result<State> {
        let mut state = self.state.write();
        let old_state = *state;
        Self::validate_transition(old_state, new_state)?;
        *state = new_state;
        log::debug!("Controller state changed: {:?} -> {:?}", old_state, new_state);
        Ok(old_state)
    }

    pub fn validate_transition(from: State, to: State) -> Result<()> {
        match (from, to) {
            (State::Released, _) => Err(PlayerError::Released),

            // Any live state can be released
            (_, State::Released) => Ok(()),

            (State::Idle, State::Preparing) => Ok(()),

            (State::Preparing, State::Buffering) => Ok(()),
            (State::Preparing, State::Ready) => Ok(()),

            (State::Buffering, State::Ready) => Ok(()),
            (State::Buffering, State::Preparing) => Ok(()),

            (State::Ready, State::Buffering) => Ok(()),
            (State::Ready, State::Preparing) => Ok(()),

            // Repeated engine reports
            (a, b) if a == b && a != State::Idle => Ok(()),

            _ => Err(PlayerError::InvalidState(format!(
                "Invalid state transition from {:?} to {:?}",
                from, to
            ))),
        }
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}
