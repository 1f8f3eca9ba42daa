pub mod config;
pub mod error;
pub mod physics;
pub mod platforms;

use serde::{Deserialize, Serialize};

use skyhop_core::{Bounds, ControlVisibility, Frame, FrameSink, GameState, Intents, SimEvent};

use config::SimConfig;
use error::SimError;
use physics::{Arena, PlayerState, Support, VerticalOutcome, is_grounded, tick_player};
use platforms::{Platform, advance_platforms, layout_platforms};

/// Serializable simulation state, used for snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub arena: Arena,
    pub platforms: Vec<Platform>,
    pub player: PlayerState,
    pub game_state: GameState,
    /// Set once the arena has had positive bounds.
    pub initialized: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Ticks advanced since the last reset.
    pub tick: u64,
}

/// The platformer simulation engine.
///
/// Driven by a host that reports arena size, forwards input intents and calls
/// [`Simulation::tick`] on a fixed period while the state is `Running`.
/// Frames go out through attached [`FrameSink`]s after every reset and every
/// effectful tick.
pub struct Simulation {
    config: SimConfig,
    state: SimState,
    sinks: Vec<Box<dyn FrameSink>>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let platforms = config.platforms.iter().map(Platform::from_config).collect();
        let player = PlayerState::new(config.player.width, config.player.height);
        Self {
            config,
            state: SimState {
                arena: Arena::default(),
                platforms,
                player,
                game_state: GameState::Idle,
                initialized: false,
                move_left: false,
                move_right: false,
                tick: 0,
            },
            sinks: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn sim_state(&self) -> &SimState {
        &self.state
    }

    /// Register a renderer. It is sent the current frame right away if the
    /// arena is already initialized.
    pub fn attach_sink(&mut self, mut sink: Box<dyn FrameSink>) {
        if self.state.initialized {
            sink.present(&self.frame());
        }
        self.sinks.push(sink);
    }

    // ================================================================
    // Host events
    // ================================================================

    /// Update the arena bounds. The first time both extents are positive the
    /// simulation initializes itself with a reset.
    pub fn on_resize(&mut self, width: f64, height: f64) -> Vec<SimEvent> {
        self.state.arena = Arena::new(width, height);
        tracing::debug!(
            width = self.state.arena.width,
            height = self.state.arena.height,
            "Arena resized"
        );

        if !self.state.initialized && self.state.arena.is_positive() {
            self.state.initialized = true;
            return self.on_reset();
        }
        Vec::new()
    }

    /// Stop the run and restore the canonical start layout. Accepted from
    /// any state once the arena has been initialized.
    pub fn on_reset(&mut self) -> Vec<SimEvent> {
        if !self.state.initialized {
            tracing::debug!("Reset ignored: arena not initialized");
            return Vec::new();
        }

        let s = &mut self.state;
        s.game_state = GameState::Idle;
        s.move_left = false;
        s.move_right = false;
        s.player.vy = 0.0;
        s.tick = 0;

        if !s.arena.is_positive() {
            tracing::debug!("Reset with degenerate arena, layout unchanged");
            return vec![SimEvent::Reset];
        }

        layout_platforms(&mut s.platforms, &s.arena);
        match s.platforms.first() {
            Some(first) => s.player.place_on(first),
            None => s.player.place_above_floor(&s.arena),
        }

        tracing::info!(
            platforms = s.platforms.len(),
            x = s.player.x,
            y = s.player.y,
            "Simulation reset"
        );
        self.emit_frame();
        vec![SimEvent::Reset]
    }

    /// Begin ticking. Ignored until the arena is initialized, while already
    /// running, and after game over (which only accepts Reset).
    pub fn on_start(&mut self) -> Vec<SimEvent> {
        if !self.state.initialized || self.state.game_state != GameState::Idle {
            tracing::debug!(state = ?self.state.game_state, "Start ignored");
            return Vec::new();
        }

        let s = &mut self.state;
        s.game_state = GameState::Running;
        s.player.vy = 0.0;
        s.move_left = false;
        s.move_right = false;
        tracing::info!("Simulation started");
        vec![SimEvent::Started]
    }

    /// Apply a jump impulse if the player is grounded. Resolved immediately,
    /// so a single press can never produce more than one impulse.
    pub fn on_jump_pressed(&mut self) -> Vec<SimEvent> {
        if !self.state.game_state.is_running()
            || !self.state.arena.is_positive()
            || !self.is_grounded()
        {
            return Vec::new();
        }
        self.state.player.vy = self.config.physics.jump_velocity;
        tracing::debug!(tick = self.state.tick, "Jump");
        vec![SimEvent::Jumped]
    }

    pub fn on_move_left(&mut self, held: bool) {
        if self.state.game_state.is_running() {
            self.state.move_left = held;
        }
    }

    pub fn on_move_right(&mut self, held: bool) {
        if self.state.game_state.is_running() {
            self.state.move_right = held;
        }
    }

    /// Apply a batched input frame: held flags are latched, a jump edge is
    /// handled exactly like [`Simulation::on_jump_pressed`].
    pub fn apply_intents(&mut self, intents: &Intents) -> Vec<SimEvent> {
        self.on_move_left(intents.move_left);
        self.on_move_right(intents.move_right);
        if intents.jump {
            return self.on_jump_pressed();
        }
        Vec::new()
    }

    /// Advance the simulation by one fixed step. A no-op unless `Running`
    /// with a positive arena.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        if !self.state.game_state.is_running() || !self.state.arena.is_positive() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let s = &mut self.state;
        s.tick += 1;

        advance_platforms(&mut s.platforms, s.arena.width);

        let move_dir = Intents {
            move_left: s.move_left,
            move_right: s.move_right,
            jump: false,
        }
        .move_dir();
        let falling_before = s.player.vy != 0.0;
        let outcome = tick_player(
            &mut s.player,
            move_dir,
            &s.platforms,
            &s.arena,
            &self.config.physics,
        );

        match outcome {
            VerticalOutcome::Landed(support) if falling_before => {
                events.push(match support {
                    Support::Platform(i) => SimEvent::LandedOnPlatform(i),
                    Support::Floor => SimEvent::LandedOnFloor,
                });
            },
            VerticalOutcome::FellOut => self.trigger_game_over(&mut events),
            _ => {},
        }

        // Top-level fall-out check after the full update.
        if physics::fell_out(&self.state.player, &self.state.arena) {
            self.trigger_game_over(&mut events);
        }

        self.emit_frame();
        events
    }

    fn trigger_game_over(&mut self, events: &mut Vec<SimEvent>) {
        if self.state.game_state.is_game_over() {
            return;
        }
        let s = &mut self.state;
        s.game_state = GameState::GameOver;
        s.move_left = false;
        s.move_right = false;
        tracing::info!(tick = s.tick, y = s.player.y, "Player fell out, game over");
        events.push(SimEvent::GameOver);
    }

    // ================================================================
    // Queries
    // ================================================================

    pub fn state(&self) -> GameState {
        self.state.game_state
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn arena(&self) -> Arena {
        self.state.arena
    }

    pub fn tick_count(&self) -> u64 {
        self.state.tick
    }

    pub fn controls(&self) -> ControlVisibility {
        ControlVisibility::for_state(self.state.game_state, self.state.initialized)
    }

    pub fn player_bounds(&self) -> Bounds {
        self.state.player.bounds()
    }

    pub fn platform_bounds(&self) -> Vec<Bounds> {
        self.state.platforms.iter().map(Platform::bounds).collect()
    }

    pub fn player_velocity_y(&self) -> f64 {
        self.state.player.vy
    }

    pub fn is_grounded(&self) -> bool {
        let s = &self.state;
        is_grounded(&s.player, &s.platforms, &s.arena, &self.config.physics)
    }

    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.state.tick,
            state: self.state.game_state,
            player: self.player_bounds(),
            platforms: self.platform_bounds(),
            grounded: self.is_grounded(),
        }
    }

    fn emit_frame(&mut self) {
        if self.sinks.is_empty() {
            return;
        }
        let frame = self.frame();
        for sink in &mut self.sinks {
            sink.present(&frame);
        }
    }

    // ================================================================
    // Snapshots
    // ================================================================

    /// Encode the full simulation state as MessagePack.
    pub fn snapshot(&self) -> Result<Vec<u8>, SimError> {
        Ok(rmp_serde::to_vec(&self.state)?)
    }

    /// Replace the simulation state with a snapshot. The snapshot must match
    /// the configured bodies and carry a consistent lifecycle. On error the
    /// current state is left untouched.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), SimError> {
        let mut state: SimState = rmp_serde::from_slice(data)?;
        if state.platforms.len() != self.config.platforms.len() {
            return Err(SimError::PlatformCountMismatch {
                expected: self.config.platforms.len(),
                found: state.platforms.len(),
            });
        }

        let player = &self.config.player;
        check_size(
            "player",
            (player.width, player.height),
            (state.player.width, state.player.height),
        )?;
        for (i, (platform, configured)) in
            state.platforms.iter().zip(&self.config.platforms).enumerate()
        {
            check_size(
                &format!("platform {i}"),
                (configured.width, configured.height),
                (platform.width, platform.height),
            )?;
        }

        if !state.initialized && state.game_state != GameState::Idle {
            return Err(SimError::Uninitialized {
                state: state.game_state,
            });
        }

        state.arena = Arena::new(state.arena.width, state.arena.height);
        self.state = state;
        self.emit_frame();
        Ok(())
    }
}

fn check_size(body: &str, expected: (f64, f64), found: (f64, f64)) -> Result<(), SimError> {
    if expected == found {
        return Ok(());
    }
    Err(SimError::SizeMismatch {
        body: body.to_string(),
        expected_width: expected.0,
        expected_height: expected.1,
        found_width: found.0,
        found_height: found.1,
    })
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
