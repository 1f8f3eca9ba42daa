use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::state::GameState;

/// Everything a renderer needs to paint one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Ticks advanced since the last reset.
    pub tick: u64,
    pub state: GameState,
    pub player: Bounds,
    /// Platform bounds in declaration order.
    pub platforms: Vec<Bounds>,
    /// Whether the player could jump right now.
    pub grounded: bool,
}

/// Output port for simulation frames.
///
/// The simulation calls `present` after every reset and every effectful
/// tick. Implementations must not call back into the simulation.
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame) + Send,
{
    fn present(&mut self, frame: &Frame) {
        self(frame)
    }
}

/// Lifecycle and physics events returned from simulation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The simulation is back in `Idle`, with a fresh layout if the arena is positive.
    Reset,
    /// The clock should start ticking.
    Started,
    /// A jump impulse was applied.
    Jumped,
    /// The player came to rest on a platform, by index.
    LandedOnPlatform(usize),
    /// The player came to rest on the arena floor.
    LandedOnFloor,
    /// The player fell out of the arena; the clock should stop.
    GameOver,
}
