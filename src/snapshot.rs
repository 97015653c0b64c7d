//! Presentation snapshot
//!
//! A read-only copy of the round published after ticks for whatever renders
//! it. Renderers never touch `RoundState` directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::LANE_COUNT;
use crate::sim::{Entity, Outcome, RoundState};
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub level: u32,
    pub player_lane: u8,
    pub entities: Vec<Entity>,
    pub score: u64,
    /// Rounded for display
    pub streak: u32,
    pub speed: f32,
    /// Whole seconds left (rounded up)
    pub time_left_secs: u32,
    pub outcome: Outcome,
    pub tick: u64,
}

impl Snapshot {
    pub fn capture(state: &RoundState) -> Self {
        Self {
            level: state.level.id,
            player_lane: state.player_lane,
            entities: state.entities.clone(),
            score: state.score,
            streak: state.streak.round() as u32,
            speed: state.speed,
            time_left_secs: (state.remaining_ms() / 1000.0).ceil() as u32,
            outcome: state.outcome,
            tick: state.tick_count,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Entities are discarded this far below the visible edge
const OFFSCREEN_MARGIN: f32 = 30.0;

/// Maps track coordinates onto a rectangular viewport
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Viewport size in pixels
    pub size: Vec2,
    /// Track position shown at the top edge
    pub track_top: f32,
    /// Track position shown at the bottom edge
    pub track_bottom: f32,
}

impl Layout {
    /// Viewport showing the track from the spawn edge to just past the player
    pub fn new(width: f32, height: f32, tuning: &Tuning) -> Self {
        Self {
            size: Vec2::new(width, height),
            track_top: 0.0,
            track_bottom: tuning.despawn_position - OFFSCREEN_MARGIN,
        }
    }

    pub fn lane_width(&self) -> f32 {
        self.size.x / LANE_COUNT as f32
    }

    pub fn lane_center_x(&self, lane: u8) -> f32 {
        self.lane_width() * (lane as f32 + 0.5)
    }

    fn track_to_y(&self, position: f32) -> f32 {
        let span = (self.track_bottom - self.track_top).max(f32::EPSILON);
        (position - self.track_top) / span * self.size.y
    }

    /// Screen-space center of an entity
    pub fn entity_center(&self, entity: &Entity) -> Vec2 {
        Vec2::new(self.lane_center_x(entity.lane), self.track_to_y(entity.position))
    }

    /// Screen-space center of the player in a lane
    pub fn player_center(&self, lane: u8, tuning: &Tuning) -> Vec2 {
        Vec2::new(self.lane_center_x(lane), self.track_to_y(tuning.player_position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;
    use crate::sim::EntityKind;

    #[test]
    fn test_capture_rounds_values() {
        let mut state = RoundState::new(&LevelTable::default().levels[0], 1);
        state.streak = 11.6;
        state.elapsed_ms = 14_001.0;
        state.push_entity(2, EntityKind::Obstacle, 5.0);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.streak, 12);
        assert_eq!(snap.time_left_secs, 1);
        assert_eq!(snap.entities.len(), 1);
        assert_eq!(snap.outcome, Outcome::InProgress);
        assert!(snap.to_json().contains("\"player_lane\":1"));
    }

    #[test]
    fn test_layout_lanes() {
        let tuning = Tuning::default();
        let layout = Layout::new(300.0, 490.0, &tuning);
        assert_eq!(layout.lane_center_x(0), 50.0);
        assert_eq!(layout.lane_center_x(2), 250.0);

        let player = layout.player_center(1, &tuning);
        assert_eq!(player.x, 150.0);
        assert!(player.y > 0.0 && player.y < layout.size.y);
    }
}
