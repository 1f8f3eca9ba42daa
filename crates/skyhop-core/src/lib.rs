pub mod bounds;
pub mod frame;
pub mod input;
pub mod state;

pub use bounds::Bounds;
pub use frame::{Frame, FrameSink, SimEvent};
pub use input::Intents;
pub use state::{ControlVisibility, GameState};

/// Nominal period of the external simulation clock, in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 16;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::bounds::Bounds;
    use crate::frame::{Frame, FrameSink};
    use crate::state::GameState;

    /// Frame sink that records every presented frame. Clones share storage,
    /// so a test can keep one handle and hand the other to the simulation.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        frames: Arc<Mutex<Vec<Frame>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of all frames recorded so far.
        pub fn frames(&self) -> Vec<Frame> {
            self.frames.lock().map(|f| f.clone()).unwrap_or_default()
        }

        pub fn len(&self) -> usize {
            self.frames.lock().map(|f| f.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn last(&self) -> Option<Frame> {
            self.frames.lock().ok().and_then(|f| f.last().cloned())
        }

        pub fn clear(&self) {
            if let Ok(mut f) = self.frames.lock() {
                f.clear();
            }
        }
    }

    impl FrameSink for RecordingSink {
        fn present(&mut self, frame: &Frame) {
            if let Ok(mut f) = self.frames.lock() {
                f.push(frame.clone());
            }
        }
    }

    /// Build a frame with the given player and platform bounds, in `Idle`.
    pub fn make_frame(player: Bounds, platforms: Vec<Bounds>) -> Frame {
        Frame {
            tick: 0,
            state: GameState::Idle,
            player,
            platforms,
            grounded: false,
        }
    }

    /// Assert two floats are equal within `1e-9`.
    pub fn assert_close(actual: f64, expected: f64, what: &str) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{what}: expected {expected}, got {actual}"
        );
    }
}
