//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level pack can retune the feel
//! without touching the simulation. Track positions are in track units:
//! 0 is the spawn edge and values grow toward the player.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Clock ===
    /// Upper bound on a single frame delta (ms)
    pub max_delta_ms: f64,
    /// Frame duration that one unit of speed is normalized to (ms)
    pub tick_unit_ms: f64,

    // === Track geometry ===
    /// Where new entities appear (just above the visible edge)
    pub start_position: f32,
    /// Fixed position of the player along the track
    pub player_position: f32,
    /// Half-width of the collision band around the player
    pub collision_band: f32,
    /// Entities past this are discarded
    pub despawn_position: f32,

    // === Spawning ===
    pub spawn_enabled: bool,
    /// Spawn interval numerator (ms)
    pub spawn_base_ms: f64,
    /// Speed multiplier in the spawn interval denominator
    pub spawn_scale: f64,
    /// Spawn interval floor (ms)
    pub min_spawn_ms: f64,

    // === Difficulty ===
    /// Speed gained per elapsed millisecond
    pub speed_ramp_per_ms: f32,
    /// Optional hard cap on speed
    pub max_speed: Option<f32>,

    // === Scoring ===
    pub collect_score: u64,
    pub collect_streak_bonus: f32,
    pub streak_max: f32,
    /// Streak lost on every spawn tick
    pub passive_decay: f32,
    /// Streak lost on a spawn tick while the player is looking away
    pub away_decay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_delta_ms: 50.0,
            tick_unit_ms: 16.0,

            start_position: -36.0,
            player_position: 412.0,
            collision_band: 23.5,
            despawn_position: 520.0,

            spawn_enabled: true,
            spawn_base_ms: 1200.0,
            spawn_scale: 0.8,
            min_spawn_ms: 450.0,

            speed_ramp_per_ms: 1.0 / 25_000.0,
            max_speed: None,

            collect_score: 50,
            collect_streak_bonus: 12.0,
            streak_max: 100.0,
            passive_decay: 0.8,
            away_decay: 5.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delta_ms <= 0.0 || self.tick_unit_ms <= 0.0 {
            return Err(ConfigError::Validation(
                "Frame timing values must be positive".to_string(),
            ));
        }
        if !(self.start_position < self.player_position - self.collision_band) {
            return Err(ConfigError::Validation(
                "Entities must spawn before the collision band".to_string(),
            ));
        }
        if !(self.player_position + self.collision_band < self.despawn_position) {
            return Err(ConfigError::Validation(
                "Despawn position must lie past the collision band".to_string(),
            ));
        }
        if self.collision_band <= 0.0 {
            return Err(ConfigError::Validation(
                "Collision band must be positive".to_string(),
            ));
        }
        if self.spawn_base_ms <= 0.0 || self.spawn_scale <= 0.0 || self.min_spawn_ms < 0.0 {
            return Err(ConfigError::Validation(
                "Spawn interval parameters must be positive".to_string(),
            ));
        }
        if self.speed_ramp_per_ms < 0.0 {
            return Err(ConfigError::Validation(
                "Speed ramp cannot be negative".to_string(),
            ));
        }
        if self.streak_max <= 0.0 || self.passive_decay < 0.0 || self.away_decay < 0.0 {
            return Err(ConfigError::Validation(
                "Streak limits must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Lower edge of the collision band
    #[inline]
    pub fn band_start(&self) -> f32 {
        self.player_position - self.collision_band
    }

    /// Upper edge of the collision band
    #[inline]
    pub fn band_end(&self) -> f32 {
        self.player_position + self.collision_band
    }
}
