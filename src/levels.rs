//! Level table
//!
//! Levels are static for the life of a round. Ids are contiguous from 1 so
//! the unlock frontier can be a single number.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default share of spawns that are obstacles
pub const DEFAULT_OBSTACLE_WEIGHT: f32 = 0.65;

fn default_obstacle_weight() -> f32 {
    DEFAULT_OBSTACLE_WEIGHT
}

/// One playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Travel speed at the start of the round (track units per tick unit)
    pub base_speed: f32,
    pub duration_seconds: f32,
    /// Probability that a spawn is an obstacle rather than a collectible
    #[serde(default = "default_obstacle_weight")]
    pub obstacle_weight: f32,
}

impl LevelConfig {
    pub fn new(
        id: u32,
        name: &str,
        description: &str,
        base_speed: f32,
        duration_seconds: f32,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            base_speed,
            duration_seconds,
            obstacle_weight: DEFAULT_OBSTACLE_WEIGHT,
        }
    }

    /// Round length in milliseconds
    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_seconds as f64 * 1000.0
    }
}

/// Ordered set of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub levels: Vec<LevelConfig>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig::new(1, "Beginner", "Mental Warm-up", 1.5, 15.0),
                LevelConfig::new(2, "Easy", "Focus Stability", 4.0, 15.0),
                LevelConfig::new(3, "Medium", "Deep Attention", 7.0, 18.0),
                LevelConfig::new(4, "Hard", "Cognitive Endurance", 11.0, 20.0),
                LevelConfig::new(5, "Master", "Flow State Master", 16.0, 20.0),
            ],
        }
    }
}

impl LevelTable {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        let table = Self { levels };
        table.validate()?;
        Ok(table)
    }

    /// Parse a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Validation(
                "Level table must contain at least one level".to_string(),
            ));
        }

        for (i, level) in self.levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if level.id != expected {
                return Err(ConfigError::Validation(format!(
                    "Level ids must be contiguous from 1: expected {}, found {}",
                    expected, level.id
                )));
            }
            if level.base_speed <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Level {} base speed must be positive",
                    level.id
                )));
            }
            if level.duration_seconds <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Level {} duration must be positive",
                    level.id
                )));
            }
            if !(0.0..=1.0).contains(&level.obstacle_weight) {
                return Err(ConfigError::Validation(format!(
                    "Level {} obstacle weight must be within [0, 1]",
                    level.id
                )));
            }
        }

        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Highest level id in the table
    pub fn max_id(&self) -> u32 {
        self.levels.last().map(|l| l.id).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_valid() {
        let table = LevelTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.max_id(), 5);
        assert_eq!(table.get(3).map(|l| l.name.as_str()), Some("Medium"));
        assert_eq!(table.get(1).map(|l| l.duration_ms()), Some(15_000.0));
    }

    #[test]
    fn test_json_levels_default_weight() {
        let json = r#"[
            { "id": 1, "name": "Warm", "base_speed": 2.0, "duration_seconds": 10.0 },
            { "id": 2, "name": "Hot", "base_speed": 5.0, "duration_seconds": 12.0, "obstacle_weight": 0.9 }
        ]"#;
        let table = LevelTable::from_json(json).expect("valid table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.levels[0].obstacle_weight, DEFAULT_OBSTACLE_WEIGHT);
        assert_eq!(table.levels[1].obstacle_weight, 0.9);
    }

    #[test]
    fn test_gap_in_ids_rejected() {
        let levels = vec![
            LevelConfig::new(1, "A", "", 1.0, 10.0),
            LevelConfig::new(3, "C", "", 1.0, 10.0),
        ];
        assert!(matches!(
            LevelTable::new(levels),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(LevelTable::from_json("[]").is_err());
    }

    #[test]
    fn test_bad_weight_rejected() {
        let mut level = LevelConfig::new(1, "A", "", 1.0, 10.0);
        level.obstacle_weight = 1.5;
        assert!(LevelTable::new(vec![level]).is_err());
    }
}
