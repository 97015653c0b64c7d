//! Round state and core simulation types
//!
//! `RoundState` is owned exclusively by the tick function. Renderers only
//! ever see a `Snapshot` copied out of it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{CENTER_LANE, LANE_COUNT};
use crate::levels::LevelConfig;
use crate::tuning::Tuning;

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ends the round on contact
    Obstacle,
    /// Scores and builds streak on contact
    Collectible,
}

/// A falling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    /// Fixed at spawn
    pub lane: u8,
    pub kind: EntityKind,
    /// Progress along the track (grows toward the player)
    pub position: f32,
}

/// Round result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    /// Hit an obstacle
    Failed,
    /// Survived until the timer ran out
    Completed,
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::InProgress => "in_progress",
            Outcome::Failed => "failed",
            Outcome::Completed => "completed",
        }
    }
}

/// Things that happened during a tick (for logging and feedback)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: u32, lane: u8, kind: EntityKind },
    Collected { id: u32, lane: u8 },
    Hit { id: u32, lane: u8 },
    Completed,
}

/// Authoritative state of one play session at one level
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Level being played (immutable during the round)
    pub level: LevelConfig,
    /// Seed the round's RNG was created from
    pub seed: u64,
    pub player_lane: u8,
    /// Entities in spawn order
    pub entities: Vec<Entity>,
    /// Current travel speed
    pub speed: f32,
    pub score: u64,
    pub streak: f32,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    pub spawn_accumulator_ms: f64,
    pub outcome: Outcome,
    /// Simulation ticks advanced
    pub tick_count: u64,
    rng: Pcg32,
    next_id: u32,
}

impl RoundState {
    /// Fresh round at the given level
    pub fn new(level: &LevelConfig, seed: u64) -> Self {
        Self {
            level: level.clone(),
            seed,
            player_lane: CENTER_LANE,
            entities: Vec::new(),
            speed: level.base_speed,
            score: 0,
            streak: 0.0,
            elapsed_ms: 0.0,
            duration_ms: level.duration_ms(),
            spawn_accumulator_ms: 0.0,
            outcome: Outcome::InProgress,
            tick_count: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Round RNG (spawn lanes and kinds)
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Place an entity directly (scripted scenarios, replays)
    pub fn push_entity(&mut self, lane: u8, kind: EntityKind, position: f32) -> u32 {
        debug_assert!(lane < LANE_COUNT);
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            lane,
            kind,
            position,
        });
        id
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.outcome == Outcome::InProgress
    }

    /// Move the player to an absolute lane. Out-of-range lanes and finished
    /// rounds are ignored.
    pub fn set_lane(&mut self, lane: u8) -> bool {
        if !self.is_active() || lane >= LANE_COUNT {
            return false;
        }
        self.player_lane = lane;
        true
    }

    pub fn move_left(&mut self) -> bool {
        match self.player_lane.checked_sub(1) {
            Some(lane) => self.set_lane(lane),
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        self.set_lane(self.player_lane + 1)
    }

    /// Milliseconds left before the round completes
    pub fn remaining_ms(&self) -> f64 {
        (self.duration_ms - self.elapsed_ms).max(0.0)
    }

    /// Terminal transition; a finished round never changes outcome again
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        debug_assert!(outcome.is_terminal());
        if self.is_active() {
            self.outcome = outcome;
        }
    }

    pub(crate) fn add_streak(&mut self, amount: f32, tuning: &Tuning) {
        self.streak = (self.streak + amount).clamp(0.0, tuning.streak_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;

    fn level() -> LevelConfig {
        LevelTable::default().levels[0].clone()
    }

    #[test]
    fn test_new_round() {
        let state = RoundState::new(&level(), 7);
        assert_eq!(state.player_lane, CENTER_LANE);
        assert_eq!(state.speed, 1.5);
        assert_eq!(state.duration_ms, 15_000.0);
        assert!(state.entities.is_empty());
        assert!(state.is_active());
    }

    #[test]
    fn test_lane_moves_stay_in_bounds() {
        let mut state = RoundState::new(&level(), 7);
        assert!(state.move_left());
        assert!(!state.move_left());
        assert_eq!(state.player_lane, 0);
        assert!(state.move_right());
        assert!(state.move_right());
        assert!(!state.move_right());
        assert_eq!(state.player_lane, LANE_COUNT - 1);
        assert!(!state.set_lane(LANE_COUNT));
    }

    #[test]
    fn test_finish_is_sticky() {
        let mut state = RoundState::new(&level(), 7);
        state.finish(Outcome::Failed);
        state.finish(Outcome::Completed);
        assert_eq!(state.outcome, Outcome::Failed);
        assert!(!state.set_lane(0));
    }

    #[test]
    fn test_entity_ids_unique() {
        let mut state = RoundState::new(&level(), 7);
        let a = state.push_entity(0, EntityKind::Obstacle, 0.0);
        let b = state.push_entity(0, EntityKind::Obstacle, 0.0);
        assert_ne!(a, b);
    }
}
