//! Connection State Machine
//!
//! Tracks where this client is in a room's lifecycle, from picking a code to
//! the final score.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Client states
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmState {
    Idle,
    Connecting,
    /// In the room, but a player slot is still empty
    Waiting,
    Playing,
    Ended,
    Disconnected,
}

/// Actions that trigger state transitions
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    JoinRoom,
    Welcomed,
    Rejected,
    OpponentJoined,
    OpponentLeft,
    GameOver,
    Disconnected,
    Leave,
}

/// Result of a state transition
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone)]
pub struct TransitionResult {
    success: bool,
    from_state: FsmState,
    to_state: FsmState,
    action: GameAction,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl TransitionResult {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn success(&self) -> bool {
        self.success
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    #[allow(clippy::wrong_self_convention)]
    pub fn from_state(&self) -> FsmState {
        self.from_state
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn to_state(&self) -> FsmState {
        self.to_state
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn action(&self) -> GameAction {
        self.action
    }
}

/// Connection Finite State Machine
#[derive(Debug)]
pub struct GameFsm {
    state: FsmState,
}

impl GameFsm {
    pub fn new() -> Self {
        Self {
            state: FsmState::Idle,
        }
    }

    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Get current state as string (for JS interop)
    pub fn state_string(&self) -> String {
        format!("{:?}", self.state)
    }

    pub fn can_transition(&self, action: GameAction) -> bool {
        self.get_next_state(action).is_some()
    }

    /// Attempt a transition
    pub fn transition(&mut self, action: GameAction) -> TransitionResult {
        let from_state = self.state;

        match self.get_next_state(action) {
            Some(next_state) => {
                if next_state != from_state {
                    log::info!("FSM: {:?} --{:?}--> {:?}", from_state, action, next_state);
                }
                self.state = next_state;
                TransitionResult {
                    success: true,
                    from_state,
                    to_state: next_state,
                    action,
                }
            }
            None => TransitionResult {
                success: false,
                from_state,
                to_state: from_state,
                action,
            },
        }
    }

    fn get_next_state(&self, action: GameAction) -> Option<FsmState> {
        match (self.state, action) {
            // From Idle
            (FsmState::Idle, GameAction::JoinRoom) => Some(FsmState::Connecting),

            // From Connecting
            (FsmState::Connecting, GameAction::Welcomed) => Some(FsmState::Waiting),
            (FsmState::Connecting, GameAction::Rejected) => Some(FsmState::Idle),
            (FsmState::Connecting, GameAction::Disconnected) => Some(FsmState::Disconnected),

            // From Waiting
            (FsmState::Waiting, GameAction::OpponentJoined) => Some(FsmState::Playing),
            (FsmState::Waiting, GameAction::OpponentLeft) => Some(FsmState::Waiting),
            // Joined a room whose game is already over
            (FsmState::Waiting, GameAction::GameOver) => Some(FsmState::Ended),

            // From Playing
            (FsmState::Playing, GameAction::OpponentJoined) => Some(FsmState::Playing),
            (FsmState::Playing, GameAction::OpponentLeft) => Some(FsmState::Waiting),
            (FsmState::Playing, GameAction::GameOver) => Some(FsmState::Ended),

            // Any live state can lose the socket
            (
                FsmState::Waiting | FsmState::Playing | FsmState::Ended,
                GameAction::Disconnected,
            ) => Some(FsmState::Disconnected),

            // Back to the start
            (FsmState::Ended | FsmState::Disconnected, GameAction::Leave) => Some(FsmState::Idle),

            // Invalid transition
            _ => None,
        }
    }

    /// Joined a room and the socket is still up
    pub fn in_room(&self) -> bool {
        matches!(
            self.state,
            FsmState::Waiting | FsmState::Playing | FsmState::Ended
        )
    }
}

impl Default for GameFsm {
    fn default() -> Self {
        Self::new()
    }
}
