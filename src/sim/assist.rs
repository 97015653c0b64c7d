//! Attention-driven assist ("Neuro-Pilot")
//!
//! An external classifier reports the player's attention on its own cadence.
//! While assist mode is on, a policy may pick the player's lane once per tick.
//! Policies only choose lanes; collision and scoring rules are unchanged.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::{EntityKind, RoundState};
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// Latest attention classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionSignal {
    Focused,
    Distracted,
    Away,
    #[default]
    Unknown,
}

impl FromStr for AttentionSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "focused" => Ok(AttentionSignal::Focused),
            "distracted" => Ok(AttentionSignal::Distracted),
            "away" => Ok(AttentionSignal::Away),
            "unknown" => Ok(AttentionSignal::Unknown),
            other => Err(format!("unknown attention signal: {}", other)),
        }
    }
}

/// Pluggable lane-choice strategy
pub trait AssistPolicy {
    /// Lane to move to before this tick's collisions, if any
    fn choose_lane(
        &mut self,
        state: &RoundState,
        attention: AttentionSignal,
        tuning: &Tuning,
    ) -> Option<u8>;
}

/// Dodges imminent obstacles and steers toward nearby collectibles, but only
/// while the player is focused.
#[derive(Debug, Clone)]
pub struct NeuroPilot {
    /// How far ahead of the band an obstacle counts as imminent
    pub threat_lookahead: f32,
    /// How far ahead of the band a collectible is worth chasing
    pub reward_lookahead: f32,
}

impl Default for NeuroPilot {
    fn default() -> Self {
        Self {
            threat_lookahead: 180.0,
            reward_lookahead: 220.0,
        }
    }
}

impl NeuroPilot {
    fn approaching(position: f32, lookahead: f32, tuning: &Tuning) -> bool {
        position >= tuning.band_start() - lookahead && position <= tuning.band_end()
    }

    fn lane_threatened(&self, state: &RoundState, lane: u8, tuning: &Tuning) -> bool {
        state.entities.iter().any(|e| {
            e.kind == EntityKind::Obstacle
                && e.lane == lane
                && Self::approaching(e.position, self.threat_lookahead, tuning)
        })
    }

    /// Lanes ordered by distance from `from` (left before right on ties)
    fn lanes_by_distance(from: u8) -> impl Iterator<Item = u8> {
        (1..LANE_COUNT).flat_map(move |d| {
            let left = from.checked_sub(d);
            let right = Some(from + d).filter(|&l| l < LANE_COUNT);
            left.into_iter().chain(right)
        })
    }
}

impl AssistPolicy for NeuroPilot {
    fn choose_lane(
        &mut self,
        state: &RoundState,
        attention: AttentionSignal,
        tuning: &Tuning,
    ) -> Option<u8> {
        if attention != AttentionSignal::Focused || !state.is_active() {
            return None;
        }

        let current = state.player_lane;
        if self.lane_threatened(state, current, tuning) {
            return Self::lanes_by_distance(current)
                .find(|&lane| !self.lane_threatened(state, lane, tuning));
        }

        // Closest collectible to the player in a safe lane
        state
            .entities
            .iter()
            .filter(|e| {
                e.kind == EntityKind::Collectible
                    && e.lane != current
                    && Self::approaching(e.position, self.reward_lookahead, tuning)
                    && !self.lane_threatened(state, e.lane, tuning)
            })
            .max_by(|a, b| {
                a.position
                    .partial_cmp(&b.position)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.lane)
    }
}

/// Share of ticks spent focused, among ticks with a known signal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttentionTally {
    pub focused_ticks: u64,
    pub observed_ticks: u64,
}

impl AttentionTally {
    pub fn record(&mut self, signal: AttentionSignal) {
        if signal == AttentionSignal::Unknown {
            return;
        }
        self.observed_ticks += 1;
        if signal == AttentionSignal::Focused {
            self.focused_ticks += 1;
        }
    }

    /// Percentage in `[0, 100]`; zero when nothing was observed
    pub fn average(&self) -> f32 {
        if self.observed_ticks == 0 {
            return 0.0;
        }
        self.focused_ticks as f32 * 100.0 / self.observed_ticks as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelTable;

    fn round() -> RoundState {
        RoundState::new(&LevelTable::default().levels[0], 3)
    }

    #[test]
    fn test_idle_unless_focused() {
        let tuning = Tuning::default();
        let mut state = round();
        state.push_entity(1, EntityKind::Obstacle, tuning.band_start() - 10.0);
        let mut pilot = NeuroPilot::default();
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Away, &tuning), None);
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Unknown, &tuning), None);
    }

    #[test]
    fn test_dodges_to_nearest_safe_lane() {
        let tuning = Tuning::default();
        let mut state = round();
        let near = tuning.band_start() - 10.0;
        state.push_entity(1, EntityKind::Obstacle, near);
        state.push_entity(0, EntityKind::Obstacle, near);
        let mut pilot = NeuroPilot::default();
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Focused, &tuning), Some(2));
    }

    #[test]
    fn test_prefers_left_on_tie() {
        let tuning = Tuning::default();
        let mut state = round();
        state.push_entity(1, EntityKind::Obstacle, tuning.band_start() - 10.0);
        let mut pilot = NeuroPilot::default();
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Focused, &tuning), Some(0));
    }

    #[test]
    fn test_chases_closest_safe_collectible() {
        let tuning = Tuning::default();
        let mut state = round();
        let start = tuning.band_start();
        state.push_entity(0, EntityKind::Collectible, start - 100.0);
        state.push_entity(2, EntityKind::Collectible, start - 20.0);
        state.push_entity(2, EntityKind::Obstacle, start - 40.0);
        let mut pilot = NeuroPilot::default();
        // Lane 2 holds the closer orb but also a threat
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Focused, &tuning), Some(0));
    }

    #[test]
    fn test_no_choice_without_targets() {
        let tuning = Tuning::default();
        let state = round();
        let mut pilot = NeuroPilot::default();
        assert_eq!(pilot.choose_lane(&state, AttentionSignal::Focused, &tuning), None);
    }

    #[test]
    fn test_attention_tally() {
        let mut tally = AttentionTally::default();
        assert_eq!(tally.average(), 0.0);
        tally.record(AttentionSignal::Focused);
        tally.record(AttentionSignal::Focused);
        tally.record(AttentionSignal::Focused);
        tally.record(AttentionSignal::Away);
        tally.record(AttentionSignal::Unknown);
        assert_eq!(tally.average(), 75.0);
    }

    #[test]
    fn test_signal_parse() {
        assert_eq!("Focused".parse::<AttentionSignal>(), Ok(AttentionSignal::Focused));
        assert!("nope".parse::<AttentionSignal>().is_err());
    }
}
