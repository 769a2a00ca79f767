//! Simulation configuration.
//!
//! Every tunable has a default, so a config file only needs to name the
//! values it changes:
//!
//! ```toml
//! ai_players = 3
//! starting_money = 800
//!
//! [economy]
//! interval_ticks = 5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::MAX_PLAYERS;

/// Money each player starts a competitive game with.
pub const COMPETITIVE_STARTING_MONEY: i64 = 500;

/// Fog reveal radius around owned buildings, in tiles.
pub const BUILDING_VISION_RANGE: u16 = 5;

/// Economy accrual tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Accrue income every this many ticks.
    pub interval_ticks: u64,
    /// Flat income per player per accrual.
    pub base_income: i64,
    /// Income per industrial building.
    pub industrial_income: i64,
    /// Income per commercial building.
    pub commercial_income: i64,
    /// Income per any other building.
    pub building_income: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            interval_ticks: 10,
            base_income: 5,
            industrial_income: 6,
            commercial_income: 4,
            building_income: 1,
        }
    }
}

/// AI controller tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Minimum seconds between evaluations.
    pub base_interval_secs: f32,
    /// Extra random seconds added per evaluation, per player.
    pub jitter_secs: f32,
    /// Only train when fewer than this many entries are queued.
    pub max_queue: usize,
    /// Chance of picking the strongest affordable unit.
    pub strong_unit_chance: f64,
    /// Idle units needed before a mass attack is considered.
    pub attack_threshold: usize,
    /// Chance of launching a mass attack once the threshold is met.
    pub attack_chance: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_interval_secs: 3.0,
            jitter_secs: 2.0,
            max_queue: 3,
            strong_unit_chance: 0.4,
            attack_threshold: 5,
            attack_chance: 0.5,
        }
    }
}

/// Scoring weights for the live score projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Points per unit of money.
    pub money: f64,
    /// Points per housed population.
    pub population: f64,
    /// Points per owned building.
    pub building: f64,
    /// Points per enemy unit killed.
    pub unit_kill: f64,
    /// Points per enemy building destroyed.
    pub building_destroyed: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            money: 0.1,
            population: 1.0,
            building: 10.0,
            unit_kill: 5.0,
            building_destroyed: 25.0,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Map width in tiles.
    pub map_width: u16,
    /// Map height in tiles.
    pub map_height: u16,
    /// Number of AI opponents alongside the single human player.
    pub ai_players: usize,
    /// Money every player starts with.
    pub starting_money: i64,
    /// Headless runs stop after this many ticks.
    pub max_ticks: u64,
    /// Let the AI controller drive the human player too.
    pub autopilot_human: bool,
    /// Fog reveal radius around buildings.
    pub building_vision_range: u16,
    /// Seconds a dead unit stays in the table before purge.
    pub death_grace_secs: f32,
    /// Seconds a hit unit flashes.
    pub flash_secs: f32,
    /// Fire progress added to a building per hit.
    pub fire_per_hit: f32,
    /// Fraction of the map turned to water by map generation.
    pub water_fraction: f64,
    /// Economy tunables.
    pub economy: EconomyConfig,
    /// AI tunables.
    pub ai: AiConfig,
    /// Scoring weights.
    pub scoring: ScoringWeights,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_width: 48,
            map_height: 48,
            ai_players: 2,
            starting_money: COMPETITIVE_STARTING_MONEY,
            max_ticks: 36_000,
            autopilot_human: false,
            building_vision_range: BUILDING_VISION_RANGE,
            death_grace_secs: 1.5,
            flash_secs: 0.2,
            fire_per_hit: 0.1,
            water_fraction: 0.05,
            economy: EconomyConfig::default(),
            ai: AiConfig::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl SimConfig {
    /// Total number of players, human included.
    #[must_use]
    pub const fn player_count(&self) -> usize {
        self.ai_players + 1
    }

    /// Parse and validate a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SimConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render this config as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.map_width < 16 || self.map_height < 16 {
            return Err(invalid("map_width", "map must be at least 16x16"));
        }
        if self.ai_players == 0 || self.player_count() > MAX_PLAYERS {
            return Err(invalid(
                "ai_players",
                format!("must be between 1 and {}", MAX_PLAYERS - 1),
            ));
        }
        if self.building_vision_range > self.map_width.max(self.map_height) {
            return Err(invalid(
                "building_vision_range",
                "must not exceed the larger map dimension",
            ));
        }
        if self.starting_money < 0 {
            return Err(invalid("starting_money", "must not be negative"));
        }
        if self.economy.interval_ticks == 0 {
            return Err(invalid("economy.interval_ticks", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.ai.strong_unit_chance) {
            return Err(invalid("ai.strong_unit_chance", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.ai.attack_chance) {
            return Err(invalid("ai.attack_chance", "must be within [0, 1]"));
        }
        if self.ai.base_interval_secs <= 0.0 || self.ai.jitter_secs < 0.0 {
            return Err(invalid("ai.base_interval_secs", "intervals must be positive"));
        }
        if self.death_grace_secs < 0.0 {
            return Err(invalid("death_grace_secs", "must not be negative"));
        }
        if !(0.0..0.5).contains(&self.water_fraction) {
            return Err(invalid("water_fraction", "must be within [0, 0.5)"));
        }
        Ok(())
    }
}
