//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through clamped frame deltas
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod assist;
pub mod clock;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use assist::{AssistPolicy, AttentionSignal, AttentionTally, NeuroPilot};
pub use clock::{Frame, SimulationClock};
pub use collision::{Resolution, in_band};
pub use spawn::{spawn_interval_ms, speed_at};
pub use state::{Entity, EntityKind, GameEvent, Outcome, RoundState};
pub use tick::{TickInput, tick};
