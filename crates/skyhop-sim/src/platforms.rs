use serde::{Deserialize, Serialize};

use skyhop_core::Bounds;

use crate::config::PlatformConfig;
use crate::physics::Arena;

/// Default platform width.
pub const PLATFORM_WIDTH: f64 = 100.0;
/// Default platform height.
pub const PLATFORM_HEIGHT: f64 = 20.0;
/// Horizontal start of the first platform, as a fraction of arena width.
const LAYOUT_X_START: f64 = 0.2;
/// Horizontal stagger between consecutive platforms, as a fraction of arena width.
const LAYOUT_X_STEP: f64 = 0.3;

/// A horizontally oscillating platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Signed horizontal speed per tick. The sign flips at the arena walls.
    pub velocity_x: f64,
}

/// Which arena wall a platform bounced off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
}

impl Platform {
    pub fn from_config(config: &PlatformConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: config.width,
            height: config.height,
            velocity_x: config.velocity_x,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Move one tick and bounce off the arena walls. Returns the wall touched,
    /// if any. Touching a wall clamps the platform flush against it and points
    /// its velocity back into the arena.
    pub fn advance(&mut self, arena_width: f64) -> Option<Wall> {
        self.x += self.velocity_x;

        if self.x <= 0.0 {
            self.x = 0.0;
            self.velocity_x = self.velocity_x.abs();
            Some(Wall::Left)
        } else if self.x + self.width >= arena_width {
            self.x = arena_width - self.width;
            self.velocity_x = -self.velocity_x.abs();
            Some(Wall::Right)
        } else {
            None
        }
    }
}

/// Advance every platform one tick. Platforms never interact with each other.
pub fn advance_platforms(platforms: &mut [Platform], arena_width: f64) {
    for (i, platform) in platforms.iter_mut().enumerate() {
        if let Some(wall) = platform.advance(arena_width) {
            tracing::trace!(platform = i, ?wall, vx = platform.velocity_x, "Platform bounced");
        }
    }
}

/// Lay platforms out in evenly spaced rows from the bottom up, with
/// staggered horizontal starts.
///
/// Row spacing is `height / (n + 1)`, so platform `i` sits at
/// `height - spacing * (i + 1)` and starts at `width * (0.2 + 0.3 * i)`.
pub fn layout_platforms(platforms: &mut [Platform], arena: &Arena) {
    let spacing = arena.height / (platforms.len() as f64 + 1.0);

    for (i, platform) in platforms.iter_mut().enumerate() {
        let stagger = LAYOUT_X_START + LAYOUT_X_STEP * i as f64;
        platform.y = arena.height - spacing * (i as f64 + 1.0);
        platform.x = arena.width * stagger;
    }
}
