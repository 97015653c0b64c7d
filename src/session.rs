//! Round/level state machine
//!
//! `LevelSelect -> Intro -> Playing -> GameOver`, with an exit back to
//! `LevelSelect` from anywhere. The session owns the only `RoundState`, the
//! simulation clock and its frame subscription, and the I/O collaborators
//! (storage, score sink). External I/O never blocks or fails a transition.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::levels::{LevelConfig, LevelTable};
use crate::persistence::Storage;
use crate::platform::{FrameScheduler, now_ms};
use crate::progress::UnlockProgress;
use crate::report::{ScoreReport, ScoreSink};
use crate::settings::Settings;
use crate::sim::{
    AssistPolicy, AttentionSignal, AttentionTally, Frame, GameEvent, NeuroPilot, Outcome,
    RoundState, SimulationClock, TickInput, tick,
};
use crate::snapshot::Snapshot;
use crate::tuning::Tuning;

/// Coarse game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    LevelSelect,
    Intro { level: u32 },
    Playing { level: u32 },
    GameOver { level: u32, outcome: Outcome },
}

/// Discrete player lane input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneCommand {
    Left,
    Right,
    Lane(u8),
}

pub struct Session<S: FrameScheduler> {
    levels: LevelTable,
    tuning: Tuning,
    settings: Settings,
    progress: UnlockProgress,
    high_scores: HighScores,
    phase: Phase,
    round: Option<RoundState>,
    clock: SimulationClock,
    scheduler: S,
    storage: Box<dyn Storage>,
    sink: Box<dyn ScoreSink>,
    assist: Box<dyn AssistPolicy>,
    attention: AttentionSignal,
    tally: AttentionTally,
    snapshot: Option<Snapshot>,
}

impl<S: FrameScheduler> Session<S> {
    /// Build a session, restoring progress, settings and high scores.
    /// Fails if the level table or tuning does not validate.
    pub fn new(
        levels: LevelTable,
        tuning: Tuning,
        scheduler: S,
        storage: Box<dyn Storage>,
        sink: Box<dyn ScoreSink>,
    ) -> Result<Self, ConfigError> {
        levels.validate()?;
        tuning.validate()?;

        let progress = UnlockProgress::load(storage.as_ref());
        let settings = Settings::load(storage.as_ref());
        let high_scores = HighScores::load(storage.as_ref());

        Ok(Self {
            clock: SimulationClock::new(tuning.max_delta_ms),
            levels,
            tuning,
            settings,
            progress,
            high_scores,
            phase: Phase::LevelSelect,
            round: None,
            scheduler,
            storage,
            sink,
            assist: Box::new(NeuroPilot::default()),
            attention: AttentionSignal::Unknown,
            tally: AttentionTally::default(),
            snapshot: None,
        })
    }

    /// Replace the assist policy
    pub fn with_assist_policy(mut self, policy: Box<dyn AssistPolicy>) -> Self {
        self.assist = policy;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn progress(&self) -> UnlockProgress {
        self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Levels the player may currently pick
    pub fn unlocked_levels(&self) -> impl Iterator<Item = &LevelConfig> {
        let progress = self.progress;
        self.levels
            .levels
            .iter()
            .filter(move |l| progress.is_unlocked(l.id))
    }

    /// `LevelSelect -> Intro`. Locked or unknown levels are ignored.
    pub fn select_level(&mut self, level_id: u32) -> bool {
        if self.phase != Phase::LevelSelect {
            return false;
        }
        if !self.progress.is_unlocked(level_id) || self.levels.get(level_id).is_none() {
            log::debug!("Level {} is locked", level_id);
            return false;
        }

        log::info!("Level {} selected", level_id);
        self.phase = Phase::Intro { level: level_id };
        true
    }

    /// `Intro -> Playing`: fresh round, clock started
    pub fn start(&mut self, seed: u64) -> bool {
        let Phase::Intro { level: level_id } = self.phase else {
            return false;
        };
        let Some(level) = self.levels.get(level_id) else {
            return false;
        };

        let round = RoundState::new(level, seed);
        self.snapshot = Some(Snapshot::capture(&round));
        self.round = Some(round);
        self.tally = AttentionTally::default();
        self.phase = Phase::Playing { level: level_id };
        self.clock.start(&mut self.scheduler);

        log::info!("Round started: level {} seed {}", level_id, seed);
        true
    }

    /// Leave the game over screen: back to level select after a completion,
    /// back to the intro (retry) after a failure.
    pub fn acknowledge(&mut self) -> bool {
        match self.phase {
            Phase::GameOver {
                outcome: Outcome::Completed,
                ..
            } => {
                self.phase = Phase::LevelSelect;
                true
            }
            Phase::GameOver { level, .. } => {
                self.phase = Phase::Intro { level };
                true
            }
            _ => false,
        }
    }

    /// Any phase -> `LevelSelect`, cancelling any pending frame
    pub fn exit(&mut self) {
        self.clock.cancel(&mut self.scheduler);
        if let Phase::Playing { level } = self.phase {
            log::info!("Round at level {} abandoned", level);
        }
        self.round = None;
        self.snapshot = None;
        self.phase = Phase::LevelSelect;
    }

    /// Manual lane input. Ignored outside active play and in assist mode.
    pub fn input(&mut self, command: LaneCommand) -> bool {
        if self.settings.assist_mode {
            return false;
        }
        let Some(round) = self.round.as_mut().filter(|r| r.is_active()) else {
            return false;
        };

        let moved = match command {
            LaneCommand::Left => round.move_left(),
            LaneCommand::Right => round.move_right(),
            LaneCommand::Lane(lane) => round.set_lane(lane),
        };
        if moved {
            self.snapshot = Some(Snapshot::capture(round));
        }
        moved
    }

    /// Latest classifier output (ignored while the camera is off)
    pub fn set_attention(&mut self, signal: AttentionSignal) {
        self.attention = if self.settings.camera_enabled {
            signal
        } else {
            AttentionSignal::Unknown
        };
    }

    pub fn attention(&self) -> AttentionSignal {
        self.attention
    }

    pub fn set_assist_mode(&mut self, enabled: bool) {
        self.settings.assist_mode = enabled;
        self.settings.save(self.storage.as_mut());
    }

    pub fn set_camera_enabled(&mut self, enabled: bool) {
        self.settings.camera_enabled = enabled;
        if !enabled {
            self.attention = AttentionSignal::Unknown;
        }
        self.settings.save(self.storage.as_mut());
    }

    /// Host frame callback
    pub fn on_frame(&mut self, timestamp: f64) {
        let delta = match self.clock.frame(timestamp) {
            Frame::Stale => return,
            Frame::Warmup => {
                self.clock.schedule_next(&mut self.scheduler);
                return;
            }
            Frame::Advance(delta) => delta,
        };

        let Some(round) = self.round.as_mut() else {
            return;
        };

        self.tally.record(self.attention);
        let assist_lane = if self.settings.assist_mode {
            self.assist.choose_lane(round, self.attention, &self.tuning)
        } else {
            None
        };
        let input = TickInput {
            assist_lane,
            attention: self.attention,
        };

        let events = tick(round, &input, delta, &self.tuning);
        for event in &events {
            match event {
                GameEvent::Collected { id, lane } => {
                    log::debug!("Collected #{} in lane {} (score {})", id, lane, round.score)
                }
                other => log::trace!("{:?}", other),
            }
        }

        if round.outcome.is_terminal() {
            self.finish_round();
            return;
        }

        if round.tick_count % self.settings.effective_snapshot_interval() == 0 {
            self.snapshot = Some(Snapshot::capture(round));
        }
        self.clock.schedule_next(&mut self.scheduler);
    }

    /// `Playing -> GameOver`
    fn finish_round(&mut self) {
        self.clock.cancel(&mut self.scheduler);
        let Some(round) = self.round.as_ref() else {
            return;
        };

        let level = round.level.id;
        let outcome = round.outcome;
        self.phase = Phase::GameOver { level, outcome };
        self.snapshot = Some(Snapshot::capture(round));

        let report = ScoreReport {
            score: round.score,
            level,
            outcome,
            streak: round.streak.round() as u32,
            attention_avg: self.tally.average(),
            elapsed_ms: round.elapsed_ms,
        };
        log::info!(
            "Round over: level {} {} with score {}",
            level,
            outcome.as_str(),
            report.score
        );

        if outcome == Outcome::Completed
            && self.progress.record_completion(level, self.levels.max_id())
        {
            log::info!("Level {} unlocked", self.progress.highest_unlocked);
            self.progress.save(self.storage.as_mut());
        }

        let entry = HighScoreEntry {
            score: report.score,
            level,
            streak: report.streak,
            timestamp: now_ms(),
        };
        if let Some(rank) = self.high_scores.add_score(entry) {
            log::info!("New high score, rank {}", rank);
            self.high_scores.save(self.storage.as_mut());
        }

        self.sink.submit(&report);
    }
}
