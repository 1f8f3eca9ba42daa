use serde::{Deserialize, Serialize};

use skyhop_core::Bounds;

use crate::config::PhysicsConfig;
use crate::platforms::Platform;

/// Downward acceleration (units/tick^2).
pub const GRAVITY: f64 = 0.7;
/// Jump initial velocity (negative is up).
pub const JUMP_VELOCITY: f64 = -12.0;
/// Horizontal move speed (units/tick).
pub const MOVE_SPEED: f64 = 5.0;
/// Player width for AABB collision.
pub const PLAYER_WIDTH: f64 = 30.0;
/// Player height for AABB collision.
pub const PLAYER_HEIGHT: f64 = 30.0;
/// How far feet may sink below a platform top in one tick and still land.
pub const LANDING_TOLERANCE: f64 = 15.0;
/// Feet within this distance of a platform top count as grounded.
pub const GROUNDED_TOLERANCE: f64 = 0.5;
/// Gap above the floor for the spawn position when there are no platforms.
pub const FLOOR_SPAWN_GAP: f64 = 10.0;

/// Arena bounds as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    /// Non-finite or negative dimensions are stored as zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    /// The simulation only moves anything once both extents are positive.
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// State of the single player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Signed vertical speed per tick (positive is down).
    pub vy: f64,
}

impl PlayerState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            vy: 0.0,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Place the player centred on top of `platform`.
    pub fn place_on(&mut self, platform: &Platform) {
        self.x = platform.x + platform.width / 2.0 - self.width / 2.0;
        self.y = platform.top() - self.height;
    }

    /// Place the player centred just above the arena floor.
    pub fn place_above_floor(&mut self, arena: &Arena) {
        self.x = arena.width / 2.0 - self.width / 2.0;
        self.y = arena.height - self.height - FLOOR_SPAWN_GAP;
    }

    /// Keep the player fully inside the arena horizontally. If the arena is
    /// narrower than the player, the left wall wins.
    pub fn clamp_to_arena(&mut self, arena_width: f64) {
        let max_x = (arena_width - self.width).max(0.0);
        self.x = self.x.clamp(0.0, max_x);
    }
}

/// What supported the player at the end of a vertical step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Platform(usize),
    Floor,
}

/// Result of one vertical step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalOutcome {
    Landed(Support),
    Airborne,
    /// The player's top passed below the arena floor.
    FellOut,
}

/// Tick the player's physics for one fixed step: horizontal intents first,
/// then gravity and landing resolution.
pub fn tick_player(
    player: &mut PlayerState,
    move_dir: i8,
    platforms: &[Platform],
    arena: &Arena,
    physics: &PhysicsConfig,
) -> VerticalOutcome {
    move_horizontal(player, move_dir, arena, physics);
    step_vertical(player, platforms, arena, physics)
}

/// Apply held move intents. There is no horizontal momentum: the offset is
/// recomputed every tick and clamped whether or not the player is airborne.
pub fn move_horizontal(
    player: &mut PlayerState,
    move_dir: i8,
    arena: &Arena,
    physics: &PhysicsConfig,
) {
    player.x += f64::from(move_dir.signum()) * physics.move_speed;
    player.clamp_to_arena(arena.width);
}

/// Integrate gravity and resolve landings against platform tops and the floor.
///
/// A platform only catches the player if the player is falling, was entirely
/// above the platform top before this step, overlaps it horizontally, and has
/// not sunk more than `landing_tolerance` below the top. The first platform in
/// declaration order that qualifies wins, and the player is carried along by
/// that platform's horizontal velocity.
pub fn step_vertical(
    player: &mut PlayerState,
    platforms: &[Platform],
    arena: &Arena,
    physics: &PhysicsConfig,
) -> VerticalOutcome {
    let previous_y = player.y;
    player.vy += physics.gravity;
    player.y += player.vy;

    for (i, platform) in platforms.iter().enumerate() {
        if player.vy < 0.0 || previous_y + player.height > platform.top() {
            continue;
        }
        if !player.bounds().overlaps_horizontally(&platform.bounds()) {
            continue;
        }
        let bottom = player.bottom();
        if bottom < platform.top() || bottom > platform.top() + physics.landing_tolerance {
            continue;
        }

        player.y = platform.top() - player.height;
        player.vy = 0.0;
        player.x += platform.velocity_x;
        player.clamp_to_arena(arena.width);
        return VerticalOutcome::Landed(Support::Platform(i));
    }

    if physics.solid_floor && player.bottom() >= arena.height {
        player.y = arena.height - player.height;
        player.vy = 0.0;
        return VerticalOutcome::Landed(Support::Floor);
    }

    if fell_out(player, arena) {
        return VerticalOutcome::FellOut;
    }

    VerticalOutcome::Airborne
}

/// The player's top edge has passed below the arena floor.
pub fn fell_out(player: &PlayerState, arena: &Arena) -> bool {
    player.y > arena.height
}

/// Whether the player stands on something it can jump from: feet within
/// `grounded_tolerance` of a platform top with its centre over that platform,
/// or feet at or below the arena floor.
pub fn is_grounded(
    player: &PlayerState,
    platforms: &[Platform],
    arena: &Arena,
    physics: &PhysicsConfig,
) -> bool {
    let bottom = player.bottom();
    let center = player.center_x();
    let on_platform = platforms.iter().any(|p| {
        (bottom - p.top()).abs() < physics.grounded_tolerance
            && center >= p.x
            && center <= p.x + p.width
    });

    on_platform || bottom >= arena.height
}
