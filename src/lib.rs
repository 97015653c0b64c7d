//! Focus Flow - A lane-dodge attention trainer
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (clock, entities, collisions, assist)
//! - `session`: Level select / intro / playing / game over state machine
//! - `platform`: Frame scheduling (requestAnimationFrame on web, manual on native)
//! - `persistence`: Key-value storage back-ends
//! - `tuning`: Data-driven game balance
//! - `levels`: Level table

pub mod error;
pub mod highscores;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod report;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use error::{ConfigError, StorageError};
pub use highscores::HighScores;
pub use levels::{LevelConfig, LevelTable};
pub use progress::UnlockProgress;
pub use session::{LaneCommand, Phase, Session};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Number of discrete lanes
    pub const LANE_COUNT: u8 = 3;
    /// Lane the player starts each round in
    pub const CENTER_LANE: u8 = LANE_COUNT / 2;

    /// Name reported to the scoring backend
    pub const GAME_NAME: &str = "FocusFlow";
    /// Backend route accepting score submissions (same origin)
    pub const SCORE_ENDPOINT: &str = "/api/score";

    /// Storage keys
    pub const PROGRESS_KEY: &str = "focus_flow_progress";
    pub const HIGHSCORES_KEY: &str = "focus_flow_highscores";
    pub const SETTINGS_KEY: &str = "focus_flow_settings";
}

