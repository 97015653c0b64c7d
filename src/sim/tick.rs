//! Variable-step simulation tick
//!
//! One tick per delivered frame: lane choice, clock, movement, collisions,
//! spawning, difficulty. A finished round is never touched again.

use super::assist::AttentionSignal;
use super::collision::{self, Resolution};
use super::spawn::{self, speed_at};
use super::state::{GameEvent, Outcome, RoundState};
use crate::tuning::Tuning;

/// Per-tick inputs that are not discrete player events
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Lane chosen by an assist policy for this tick
    pub assist_lane: Option<u8>,
    /// Latest attention classification
    pub attention: AttentionSignal,
}

/// Advance the round by `delta_ms` (already capped by the clock)
pub fn tick(
    state: &mut RoundState,
    input: &TickInput,
    delta_ms: f64,
    tuning: &Tuning,
) -> Vec<GameEvent> {
    if state.outcome.is_terminal() {
        return Vec::new();
    }

    if let Some(lane) = input.assist_lane {
        state.set_lane(lane);
    }

    state.tick_count += 1;
    state.elapsed_ms += delta_ms;
    if state.elapsed_ms >= state.duration_ms {
        state.finish(Outcome::Completed);
        log::debug!("Round completed after {} ticks", state.tick_count);
        return vec![GameEvent::Completed];
    }

    // Movement and collisions. A hit discards this tick's movement entirely.
    let moved = spawn::advance(state, delta_ms, tuning);
    let resolution = collision::resolve(moved, state.player_lane, tuning);
    let hit = matches!(resolution, Resolution::Hit { .. });
    let mut events = collision::apply(state, resolution, tuning);
    if hit {
        return events;
    }

    let looking_away = input.attention == AttentionSignal::Away;
    if let Some(event) = spawn::spawn_step(state, delta_ms, looking_away, tuning) {
        events.push(event);
    }

    state.speed = speed_at(state.level.base_speed, state.elapsed_ms, tuning);

    events
}
