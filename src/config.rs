//! Simulation configuration.
//!
//! Every world-size, grid and capacity constant is supplied through
//! [`SimConfig`] at initialization so tests can run against small synthetic
//! worlds. The struct deserializes from JSON with per-field defaults, so a
//! config file only needs to name the values it overrides.

use crate::components::Color;
use crate::error::{Result, SimError};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Worker count used when hardware concurrency cannot be detected.
pub const FALLBACK_WORKERS: usize = 2;

/// Largest grid a config may ask for.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Size, collider radius and color used when spawning one kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityStyle {
    pub size: f32,
    pub radius: f32,
    pub color: Color,
}

/// Parameters of the default level layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub enemy_count: usize,
    pub coin_count: usize,
    /// Enemies start with each velocity axis drawn from `[-enemy_speed, enemy_speed]`.
    pub enemy_speed: f32,
    /// Coins spawn at least this far from every world edge.
    pub coin_margin: f32,
    pub player: EntityStyle,
    pub enemy: EntityStyle,
    pub coin: EntityStyle,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            enemy_count: 30,
            coin_count: 1000,
            enemy_speed: 250.0,
            coin_margin: 50.0,
            player: EntityStyle {
                size: 30.0,
                radius: 15.0,
                color: Color::PLAYER,
            },
            enemy: EntityStyle {
                size: 25.0,
                radius: 12.0,
                color: Color::ENEMY,
            },
            coin: EntityStyle {
                size: 15.0,
                radius: 8.0,
                color: Color::COIN,
            },
        }
    }
}

/// Configuration for the arena simulation.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World width in world units.
    pub world_width: f32,
    /// World height in world units.
    pub world_height: f32,
    /// Edge length of one spatial grid cell. Pick it close to the largest
    /// collider diameter to keep per-cell occupancy low.
    pub cell_size: f32,
    /// Fixed registry capacity.
    pub max_entities: usize,
    /// Motion worker override. `None` uses the detected hardware concurrency.
    pub worker_threads: Option<usize>,
    /// Coins wobble by up to this many units per axis every motion step.
    pub coin_jitter: f32,
    /// Coin pairs further apart than this on either axis are not tested.
    pub coin_screen: f32,
    /// Entities further than this from the player on either axis are not tested.
    pub player_screen: f32,
    /// Squared distances at or below this are treated as degenerate.
    pub separation_epsilon: f32,
    /// Deactivated entities are parked at this coordinate, far off the grid.
    pub park_coordinate: f32,
    /// Player speed applied by the input system.
    pub player_speed: f32,
    /// Seed for level layout. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Record per-section frame timings.
    pub profile: bool,
    pub level: LevelConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 1280.0,
            world_height: 720.0,
            cell_size: 64.0,
            max_entities: 20_000,
            worker_threads: None,
            coin_jitter: 1.0,
            coin_screen: 20.0,
            player_screen: 40.0,
            separation_epsilon: 1e-4,
            park_coordinate: -10_000.0,
            player_speed: 350.0,
            seed: None,
            profile: false,
            level: LevelConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(positive_finite(self.world_width) && positive_finite(self.world_height)) {
            return Err(SimError::InvalidConfig(format!(
                "world size must be positive and finite, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if !positive_finite(self.cell_size) {
            return Err(SimError::InvalidConfig(format!(
                "cell size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        let cells = self.grid_cols().checked_mul(self.grid_rows());
        if !matches!(cells, Some(n) if n <= MAX_GRID_CELLS) {
            return Err(SimError::InvalidConfig(format!(
                "a {}x{} world over {} unit cells exceeds {} grid cells",
                self.world_width, self.world_height, self.cell_size, MAX_GRID_CELLS
            )));
        }
        if self.max_entities == 0 || self.max_entities > u32::MAX as usize {
            return Err(SimError::InvalidConfig(format!(
                "max_entities must be in 1..={}, got {}",
                u32::MAX,
                self.max_entities
            )));
        }
        if self.worker_threads == Some(0) {
            return Err(SimError::InvalidConfig("worker_threads must be at least 1".into()));
        }
        let non_negative = [
            ("coin_jitter", self.coin_jitter),
            ("level.enemy_speed", self.level.enemy_speed),
            ("level.coin_margin", self.level.coin_margin),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Number of motion workers: the override if set, otherwise hardware
    /// concurrency, never less than one.
    pub fn worker_count(&self) -> usize {
        self.worker_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(FALLBACK_WORKERS)
            })
            .max(1)
    }

    pub fn grid_cols(&self) -> usize {
        (self.world_width / self.cell_size).ceil() as usize
    }

    pub fn grid_rows(&self) -> usize {
        (self.world_height / self.cell_size).ceil() as usize
    }
}

fn positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
