use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skyhop_core::{Frame, Intents};

use crate::config::BotConfig;

/// Distance from a wall at which the bot turns around.
const WALL_MARGIN: f64 = 1.0;

/// Seeded random input generator. Same seed and same frames give the same
/// intents.
pub struct InputBot {
    rng: StdRng,
    /// Current walking direction: -1 left, 0 standing, +1 right.
    direction: i8,
    turn_chance: f64,
    jump_chance: f64,
}

impl InputBot {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            direction: 1,
            turn_chance: probability(config.turn_chance),
            jump_chance: probability(config.jump_chance),
        }
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    /// Decide this tick's intents from the latest frame.
    pub fn next_intents(&mut self, frame: &Frame, arena_width: f64) -> Intents {
        if !frame.state.is_running() {
            return Intents::default();
        }

        if self.rng.random_bool(self.turn_chance) {
            self.direction = self.rng.random_range(-1i8..=1);
        }

        let player = &frame.player;
        if self.direction < 0 && player.left() <= WALL_MARGIN {
            self.direction = 1;
        } else if self.direction > 0 && player.right() >= arena_width - WALL_MARGIN {
            self.direction = -1;
        }

        let jump = frame.grounded && self.rng.random_bool(self.jump_chance);

        Intents {
            move_left: self.direction < 0,
            move_right: self.direction > 0,
            jump,
        }
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
