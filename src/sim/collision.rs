//! Collision and scoring resolution
//!
//! The player sits at a fixed point on the track. An entity touches the
//! player when it shares the player's lane and the span it travelled this
//! tick overlaps the collision band. Obstacles always win over collectibles
//! resolved in the same tick, and at most one collectible is resolved per
//! tick. Others in the band keep falling and resolve on later ticks.

use super::spawn::Advanced;
use super::state::{Entity, EntityKind, GameEvent, Outcome, RoundState};
use crate::tuning::Tuning;

/// Result of resolving one tick's movement against the player
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// An obstacle reached the player; nothing else from this tick applies
    Hit { id: u32, lane: u8 },
    /// No hit. Survivors continue falling; the collected entity was consumed.
    Clear {
        survivors: Vec<Entity>,
        collected: Option<(u32, u8)>,
    },
}

/// Does the span `[from, to]` overlap the collision band?
#[inline]
pub fn in_band(from: f32, to: f32, tuning: &Tuning) -> bool {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    lo <= tuning.band_end() && hi >= tuning.band_start()
}

/// Classify moved entities against the player's lane
pub fn resolve(moved: Vec<Advanced>, player_lane: u8, tuning: &Tuning) -> Resolution {
    let touching = |a: &Advanced| {
        a.entity.lane == player_lane && in_band(a.from, a.entity.position, tuning)
    };

    // Obstacles first, in spawn order
    if let Some(hit) = moved
        .iter()
        .find(|a| a.entity.kind == EntityKind::Obstacle && touching(a))
    {
        return Resolution::Hit {
            id: hit.entity.id,
            lane: hit.entity.lane,
        };
    }

    let mut survivors = Vec::with_capacity(moved.len());
    let mut collected = None;
    for advanced in moved {
        if collected.is_none()
            && advanced.entity.kind == EntityKind::Collectible
            && touching(&advanced)
        {
            collected = Some((advanced.entity.id, advanced.entity.lane));
        } else if advanced.entity.position <= tuning.despawn_position {
            survivors.push(advanced.entity);
        }
    }

    Resolution::Clear {
        survivors,
        collected,
    }
}

/// Commit a resolution to the round, returning the events it produced
pub fn apply(state: &mut RoundState, resolution: Resolution, tuning: &Tuning) -> Vec<GameEvent> {
    match resolution {
        Resolution::Hit { id, lane } => {
            state.finish(Outcome::Failed);
            log::debug!("Obstacle #{} hit in lane {}", id, lane);
            vec![GameEvent::Hit { id, lane }]
        }
        Resolution::Clear {
            survivors,
            collected,
        } => {
            state.entities = survivors;
            match collected {
                Some((id, lane)) => {
                    state.score += tuning.collect_score;
                    state.add_streak(tuning.collect_streak_bonus, tuning);
                    vec![GameEvent::Collected { id, lane }]
                }
                None => Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(id: u32, lane: u8, kind: EntityKind, from: f32, to: f32) -> Advanced {
        Advanced {
            entity: Entity {
                id,
                lane,
                kind,
                position: to,
            },
            from,
        }
    }

    #[test]
    fn test_in_band() {
        let tuning = Tuning::default();
        let p = tuning.player_position;
        assert!(in_band(p, p + 1.0, &tuning));
        assert!(!in_band(0.0, 10.0, &tuning));
        // Fast mover skipping over the band entirely
        assert!(in_band(tuning.band_start() - 10.0, tuning.band_end() + 10.0, &tuning));
        assert!(!in_band(tuning.band_end() + 1.0, tuning.band_end() + 50.0, &tuning));
    }

    #[test]
    fn test_obstacle_in_other_lane_passes() {
        let tuning = Tuning::default();
        let p = tuning.player_position;
        let res = resolve(vec![moved(1, 0, EntityKind::Obstacle, p - 1.0, p)], 1, &tuning);
        match res {
            Resolution::Clear {
                survivors,
                collected,
            } => {
                assert_eq!(survivors.len(), 1);
                assert!(collected.is_none());
            }
            other => panic!("expected clear, got {:?}", other),
        }
    }

    #[test]
    fn test_obstacle_wins_over_collectible() {
        let tuning = Tuning::default();
        let p = tuning.player_position;
        // Collectible first in spawn order, obstacle second
        let res = resolve(
            vec![
                moved(1, 1, EntityKind::Collectible, p - 2.0, p),
                moved(2, 1, EntityKind::Obstacle, p - 3.0, p - 1.0),
            ],
            1,
            &tuning,
        );
        assert_eq!(res, Resolution::Hit { id: 2, lane: 1 });
    }

    #[test]
    fn test_collect_consumes_and_scores() {
        let tuning = Tuning::default();
        let p = tuning.player_position;
        let mut state = crate::sim::RoundState::new(&crate::LevelTable::default().levels[0], 1);
        state.streak = 95.0;

        let res = resolve(vec![moved(9, 1, EntityKind::Collectible, p - 2.0, p)], 1, &tuning);
        let events = apply(&mut state, res, &tuning);

        assert_eq!(events, vec![GameEvent::Collected { id: 9, lane: 1 }]);
        assert_eq!(state.score, 50);
        assert_eq!(state.streak, 100.0);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_despawned_after_passing() {
        let tuning = Tuning::default();
        let d = tuning.despawn_position;
        let res = resolve(vec![moved(1, 2, EntityKind::Obstacle, d - 1.0, d + 1.0)], 0, &tuning);
        assert_eq!(
            res,
            Resolution::Clear {
                survivors: vec![],
                collected: None
            }
        );
    }
}
