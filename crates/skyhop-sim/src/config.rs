use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::physics::{
    GRAVITY, GROUNDED_TOLERANCE, JUMP_VELOCITY, LANDING_TOLERANCE, MOVE_SPEED, PLAYER_HEIGHT,
    PLAYER_WIDTH,
};
use crate::platforms::{PLATFORM_HEIGHT, PLATFORM_WIDTH};

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "config/sim.toml";
/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "SKYHOP_SIM_CONFIG";

/// Tunable physics constants. All values are per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration added to vertical velocity each tick.
    pub gravity: f64,
    /// Vertical velocity set by a jump (negative is up).
    pub jump_velocity: f64,
    /// Horizontal distance covered per tick while a move intent is held.
    pub move_speed: f64,
    /// How far below a platform top the player's feet may sink and still land.
    pub landing_tolerance: f64,
    /// Max distance between feet and a platform top that still counts as grounded.
    pub grounded_tolerance: f64,
    /// Whether the arena floor catches the player. With an open floor the
    /// player falls out and the run ends.
    pub solid_floor: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            move_speed: MOVE_SPEED,
            landing_tolerance: LANDING_TOLERANCE,
            grounded_tolerance: GROUNDED_TOLERANCE,
            solid_floor: true,
        }
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }
}

/// One platform slot: fixed size and initial horizontal speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub width: f64,
    pub height: f64,
    pub velocity_x: f64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            width: PLATFORM_WIDTH,
            height: PLATFORM_HEIGHT,
            velocity_x: 0.0,
        }
    }
}

impl PlatformConfig {
    pub(crate) fn with_velocity(velocity_x: f64) -> Self {
        Self {
            velocity_x,
            ..Self::default()
        }
    }
}

/// Top-level simulation configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub player: SizeConfig,
    /// Platforms in declaration order. The first one is the spawn platform.
    pub platforms: Vec<PlatformConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            player: SizeConfig::default(),
            platforms: vec![
                PlatformConfig::with_velocity(3.0),
                PlatformConfig::with_velocity(-2.5),
                PlatformConfig::with_velocity(2.0),
            ],
        }
    }
}

impl SimConfig {
    /// Load config from `$SKYHOP_SIM_CONFIG` or `config/sim.toml`, falling
    /// back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded simulation config");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using default simulation config");
                SimConfig::default()
            },
        }
    }

    /// Parse and sanitize a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, SimError> {
        let cfg: SimConfig = toml::from_str(content)?;
        Ok(cfg.sanitized())
    }

    /// Replace values the physics cannot work with (non-finite numbers,
    /// non-positive sizes, negative speeds) by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = PhysicsConfig::default();
        let physics = &mut self.physics;
        sanitize_field(&mut physics.gravity, defaults.gravity, "physics.gravity", |v| {
            v.is_finite()
        });
        sanitize_field(
            &mut physics.jump_velocity,
            defaults.jump_velocity,
            "physics.jump_velocity",
            |v| v.is_finite(),
        );
        sanitize_field(
            &mut physics.move_speed,
            defaults.move_speed,
            "physics.move_speed",
            |v| v.is_finite() && v >= 0.0,
        );
        sanitize_field(
            &mut physics.landing_tolerance,
            defaults.landing_tolerance,
            "physics.landing_tolerance",
            |v| v.is_finite() && v >= 0.0,
        );
        sanitize_field(
            &mut physics.grounded_tolerance,
            defaults.grounded_tolerance,
            "physics.grounded_tolerance",
            |v| v.is_finite() && v > 0.0,
        );

        let player = SizeConfig::default();
        sanitize_field(
            &mut self.player.width,
            player.width,
            "player.width",
            is_positive_size,
        );
        sanitize_field(
            &mut self.player.height,
            player.height,
            "player.height",
            is_positive_size,
        );

        let platform = PlatformConfig::default();
        for (i, p) in self.platforms.iter_mut().enumerate() {
            sanitize_field(
                &mut p.width,
                platform.width,
                &format!("platforms[{i}].width"),
                is_positive_size,
            );
            sanitize_field(
                &mut p.height,
                platform.height,
                &format!("platforms[{i}].height"),
                is_positive_size,
            );
            sanitize_field(
                &mut p.velocity_x,
                platform.velocity_x,
                &format!("platforms[{i}].velocity_x"),
                |v| v.is_finite(),
            );
        }
        self
    }
}

fn is_positive_size(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn sanitize_field(value: &mut f64, default: f64, name: &str, valid: impl Fn(f64) -> bool) {
    if !valid(*value) {
        tracing::warn!("{name} = {} is invalid, using {default}", *value);
        *value = default;
    }
}
