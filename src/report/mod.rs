//! Round result reporting
//!
//! On every game over the session emits a `ScoreReport` to a `ScoreSink`.
//! Sinks are fire-and-forget: `submit` never blocks and never fails from the
//! session's point of view.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::GAME_NAME;
use crate::sim::Outcome;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Summary of a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u64,
    pub level: u32,
    pub outcome: Outcome,
    pub streak: u32,
    /// Percentage of observed ticks the player was focused
    pub attention_avg: f32,
    pub elapsed_ms: f64,
}

pub trait ScoreSink {
    fn submit(&mut self, report: &ScoreReport);
}

/// Shared sink (the owner keeps a handle to inspect what was sent)
impl<T: ScoreSink> ScoreSink for Rc<RefCell<T>> {
    fn submit(&mut self, report: &ScoreReport) {
        self.borrow_mut().submit(report);
    }
}

/// Logs reports (native runs)
#[derive(Debug, Default)]
pub struct LogSink;

impl ScoreSink for LogSink {
    fn submit(&mut self, report: &ScoreReport) {
        log::info!(
            "Level {} {}: score {} streak {} attention {:.0}%",
            report.level,
            report.outcome.as_str(),
            report.score,
            report.streak,
            report.attention_avg
        );
    }
}

/// Collects reports in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub reports: Vec<ScoreReport>,
}

impl ScoreSink for MemorySink {
    fn submit(&mut self, report: &ScoreReport) {
        self.reports.push(report.clone());
    }
}

/// Extra game-specific stats carried alongside the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub outcome: Outcome,
    pub streak: u32,
    pub elapsed_ms: f64,
}

/// Body of the backend's score submission endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePayload {
    pub user_id: u32,
    pub score_value: u64,
    pub game_name: String,
    pub level_reached: u32,
    pub attention_avg: f32,
    pub details: ScoreDetails,
}

impl ScorePayload {
    pub fn from_report(report: &ScoreReport, user_id: u32) -> Self {
        Self {
            user_id,
            score_value: report.score,
            game_name: GAME_NAME.to_string(),
            level_reached: report.level,
            attention_avg: report.attention_avg,
            details: ScoreDetails {
                outcome: report.outcome,
                streak: report.streak,
                elapsed_ms: report.elapsed_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ScoreReport {
        ScoreReport {
            score: 250,
            level: 2,
            outcome: Outcome::Completed,
            streak: 40,
            attention_avg: 87.5,
            elapsed_ms: 15_000.0,
        }
    }

    #[test]
    fn test_payload_fields() {
        let payload = ScorePayload::from_report(&report(), 7);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["score_value"], 250);
        assert_eq!(json["game_name"], "FocusFlow");
        assert_eq!(json["level_reached"], 2);
        assert_eq!(json["details"]["outcome"], "Completed");
        assert_eq!(json["details"]["streak"], 40);
    }

    #[test]
    fn test_score_route() {
        assert_eq!(crate::consts::SCORE_ENDPOINT, "/api/score");
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::default();
        sink.submit(&report());
        LogSink.submit(&report());
        assert_eq!(sink.reports, vec![report()]);
    }
}
