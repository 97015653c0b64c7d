//! Entity manager: speed ramp, movement and spawning

use rand::Rng;

use super::state::{Entity, EntityKind, GameEvent, RoundState};
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// Travel speed after `elapsed_ms` of play. Non-decreasing in elapsed time.
pub fn speed_at(base_speed: f32, elapsed_ms: f64, tuning: &Tuning) -> f32 {
    let speed = base_speed + (elapsed_ms as f32) * tuning.speed_ramp_per_ms;
    match tuning.max_speed {
        Some(cap) => speed.min(cap.max(base_speed)),
        None => speed,
    }
}

/// Time between spawns at the given speed (shrinks as speed grows, floored)
pub fn spawn_interval_ms(speed: f32, tuning: &Tuning) -> f64 {
    let denom = (speed as f64 * tuning.spawn_scale).max(f64::EPSILON);
    (tuning.spawn_base_ms / denom).max(tuning.min_spawn_ms)
}

/// Distance an entity travels during `delta_ms` at `speed`
#[inline]
pub fn travel(speed: f32, delta_ms: f64, tuning: &Tuning) -> f32 {
    speed * (delta_ms / tuning.tick_unit_ms) as f32
}

/// Entity moved this tick, with where it started
#[derive(Debug, Clone)]
pub struct Advanced {
    pub entity: Entity,
    pub from: f32,
}

/// Compute the next position of every entity, dropping those past the
/// despawn edge. The state is left untouched so a hit can discard the result.
pub fn advance(state: &RoundState, delta_ms: f64, tuning: &Tuning) -> Vec<Advanced> {
    let step = travel(state.speed, delta_ms, tuning);
    let mut moved = Vec::with_capacity(state.entities.len());

    for entity in &state.entities {
        let from = entity.position;
        let to = from + step;
        // Swept entities still get a collision check on the tick they leave
        if from > tuning.despawn_position {
            continue;
        }
        moved.push(Advanced {
            entity: Entity {
                position: to,
                ..entity.clone()
            },
            from,
        });
    }

    moved
}

/// Accumulate spawn time and emit at most one entity. Every spawn tick also
/// applies streak decay (heavier while the player is looking away).
pub fn spawn_step(
    state: &mut RoundState,
    delta_ms: f64,
    looking_away: bool,
    tuning: &Tuning,
) -> Option<GameEvent> {
    if !tuning.spawn_enabled {
        return None;
    }

    state.spawn_accumulator_ms += delta_ms;
    let interval = spawn_interval_ms(state.speed, tuning);
    if state.spawn_accumulator_ms <= interval {
        return None;
    }
    state.spawn_accumulator_ms = 0.0;

    let obstacle_weight = state.level.obstacle_weight.clamp(0.0, 1.0) as f64;
    let rng = state.rng();
    let lane = rng.random_range(0..LANE_COUNT);
    let kind = if rng.random_bool(obstacle_weight) {
        EntityKind::Obstacle
    } else {
        EntityKind::Collectible
    };
    let id = state.push_entity(lane, kind, tuning.start_position);

    let decay = if looking_away {
        tuning.away_decay
    } else {
        tuning.passive_decay
    };
    state.add_streak(-decay, tuning);

    log::trace!("Spawned {:?} #{} in lane {}", kind, id, lane);
    Some(GameEvent::Spawned { id, lane, kind })
}
