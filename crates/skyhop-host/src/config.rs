use serde::Deserialize;

use skyhop_core::TICK_INTERVAL_MS;

/// Host configuration, loaded from `skyhop.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Arena size reported to the simulation at startup.
    pub arena_width: f64,
    pub arena_height: f64,
    pub tick_interval_ms: u64,
    /// Stop the session after this many ticks. Zero runs until interrupted.
    pub max_ticks: u64,
    /// Issue Reset and Start automatically after a game over.
    pub auto_restart: bool,
    /// Print every frame as a JSON line on stdout.
    pub frame_log: bool,
    pub bot: BotConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            arena_width: 400.0,
            arena_height: 800.0,
            tick_interval_ms: TICK_INTERVAL_MS,
            max_ticks: 3600,
            auto_restart: true,
            frame_log: false,
            bot: BotConfig::default(),
        }
    }
}

/// Input bot tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub enabled: bool,
    pub seed: u64,
    /// Chance per tick of picking a new walking direction.
    pub turn_chance: f64,
    /// Chance per grounded tick of jumping.
    pub jump_chance: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: 0x5eed,
            turn_chance: 0.02,
            jump_chance: 0.05,
        }
    }
}

impl HostConfig {
    /// Clamp values that would stall the loop or panic the bot, logging
    /// each correction.
    pub fn validate(&mut self) {
        if self.tick_interval_ms == 0 {
            tracing::warn!("tick_interval_ms must be > 0, using {TICK_INTERVAL_MS}");
            self.tick_interval_ms = TICK_INTERVAL_MS;
        }
        if !(self.arena_width.is_finite() && self.arena_height.is_finite()) {
            tracing::warn!(
                width = self.arena_width,
                height = self.arena_height,
                "Arena size is not finite, using defaults"
            );
            let defaults = HostConfig::default();
            self.arena_width = defaults.arena_width;
            self.arena_height = defaults.arena_height;
        }
        for (name, chance) in [
            ("bot.turn_chance", &mut self.bot.turn_chance),
            ("bot.jump_chance", &mut self.bot.jump_chance),
        ] {
            if !(0.0..=1.0).contains(&*chance) {
                let clamped = if chance.is_nan() {
                    0.0
                } else {
                    chance.clamp(0.0, 1.0)
                };
                tracing::warn!("{name} = {} is outside [0, 1], using {clamped}", *chance);
                *chance = clamped;
            }
        }
    }

    /// Load config from `skyhop.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("skyhop.toml") {
            Ok(content) => match toml::from_str::<HostConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from skyhop.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse skyhop.toml: {e}, using defaults");
                    HostConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No skyhop.toml found, using defaults");
                HostConfig::default()
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate();
        config
    }

    /// Apply `SKYHOP_*` overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SKYHOP_ARENA_WIDTH")
            && let Ok(n) = val.parse::<f64>()
        {
            self.arena_width = n;
        }
        if let Some(val) = var("SKYHOP_ARENA_HEIGHT")
            && let Ok(n) = val.parse::<f64>()
        {
            self.arena_height = n;
        }
        if let Some(val) = var("SKYHOP_TICK_INTERVAL_MS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.tick_interval_ms = n;
        }
        if let Some(val) = var("SKYHOP_MAX_TICKS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.max_ticks = n;
        }
        if let Some(val) = var("SKYHOP_AUTO_RESTART")
            && let Ok(b) = val.parse::<bool>()
        {
            self.auto_restart = b;
        }
        if let Some(val) = var("SKYHOP_FRAME_LOG")
            && let Ok(b) = val.parse::<bool>()
        {
            self.frame_log = b;
        }
        if let Some(val) = var("SKYHOP_BOT_SEED")
            && let Ok(n) = val.parse::<u64>()
        {
            self.bot.seed = n;
        }
        if let Some(val) = var("SKYHOP_BOT_ENABLED")
            && let Ok(b) = val.parse::<bool>()
        {
            self.bot.enabled = b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = HostConfig::default();
        assert_eq!(cfg.arena_width, 400.0);
        assert_eq!(cfg.arena_height, 800.0);
        assert_eq!(cfg.tick_interval_ms, 16);
        assert!(cfg.auto_restart);
        assert!(!cfg.frame_log);
        assert!(cfg.bot.enabled);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
arena_width = 640.0
frame_log = true

[bot]
seed = 42
"#;
        let cfg: HostConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.arena_width, 640.0);
        assert_eq!(cfg.arena_height, 800.0);
        assert!(cfg.frame_log);
        assert_eq!(cfg.bot.seed, 42);
        assert_eq!(cfg.bot.jump_chance, BotConfig::default().jump_chance);
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let cfg: HostConfig = toml::from_str(include_str!("../../../skyhop.toml")).unwrap();
        assert_eq!(cfg, HostConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = HostConfig::default();
        cfg.apply_env_overrides(env(&[
            ("SKYHOP_ARENA_WIDTH", "1024"),
            ("SKYHOP_MAX_TICKS", "0"),
            ("SKYHOP_FRAME_LOG", "true"),
            ("SKYHOP_BOT_SEED", "7"),
        ]));
        assert_eq!(cfg.arena_width, 1024.0);
        assert_eq!(cfg.max_ticks, 0);
        assert!(cfg.frame_log);
        assert_eq!(cfg.bot.seed, 7);
    }

    #[test]
    fn unparseable_env_is_ignored() {
        let mut cfg = HostConfig::default();
        cfg.apply_env_overrides(env(&[
            ("SKYHOP_TICK_INTERVAL_MS", "fast"),
            ("SKYHOP_AUTO_RESTART", "yes"),
        ]));
        assert_eq!(cfg, HostConfig::default());
    }

    #[test]
    fn validate_fixes_bad_values() {
        let mut cfg = HostConfig {
            tick_interval_ms: 0,
            arena_width: f64::NAN,
            bot: BotConfig {
                turn_chance: 3.0,
                jump_chance: f64::NAN,
                ..BotConfig::default()
            },
            ..HostConfig::default()
        };
        cfg.validate();
        assert_eq!(cfg.tick_interval_ms, TICK_INTERVAL_MS);
        assert_eq!(cfg.arena_width, 400.0);
        assert_eq!(cfg.bot.turn_chance, 1.0);
        assert_eq!(cfg.bot.jump_chance, 0.0);
    }

    #[test]
    fn validate_accepts_default() {
        let mut cfg = HostConfig::default();
        cfg.validate();
        assert_eq!(cfg, HostConfig::default());
    }
}
