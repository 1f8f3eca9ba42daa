use serde::{Deserialize, Serialize};

/// Lifecycle of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Not started yet, or freshly reset. Only Start is accepted.
    #[default]
    Idle,
    /// Ticking and responsive to input.
    Running,
    /// The player fell out of the arena. Only Reset is accepted.
    GameOver,
}

impl GameState {
    pub fn is_running(self) -> bool {
        self == GameState::Running
    }

    pub fn is_game_over(self) -> bool {
        self == GameState::GameOver
    }
}

/// Which lifecycle controls a presentation shell should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlVisibility {
    pub start: bool,
    pub reset: bool,
}

impl ControlVisibility {
    /// Start is offered only in `Idle` once the arena has been initialized;
    /// Reset only in `GameOver`.
    pub fn for_state(state: GameState, initialized: bool) -> Self {
        Self {
            start: initialized && state == GameState::Idle,
            reset: state == GameState::GameOver,
        }
    }
}
