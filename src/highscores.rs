//! High score leaderboard system
//!
//! Persisted through `Storage`, tracks top 10 scores across all levels.

use serde::{Deserialize, Serialize};

use crate::consts::HIGHSCORES_KEY;
use crate::persistence::{Storage, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Level played
    pub level: u32,
    /// Streak when the round ended
    pub streak: u32,
    /// Host timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Best score recorded on one level
    pub fn best_for_level(&self, level: u32) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.level == level)
            .map(|e| e.score)
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<HighScores>(storage, HIGHSCORES_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable high scores: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, HIGHSCORES_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn entry(score: u64, level: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            level,
            streak: 0,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(50));
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry(100, 1)), Some(1));
        assert_eq!(scores.add_score(entry(300, 2)), Some(1));
        assert_eq!(scores.add_score(entry(200, 1)), Some(2));
        assert_eq!(scores.top_score(), Some(300));
        assert_eq!(scores.best_for_level(1), Some(200));
        assert_eq!(scores.best_for_level(4), None);
    }

    #[test]
    fn test_truncates_to_max() {
        let mut scores = HighScores::new();
        for i in 1..=(MAX_HIGH_SCORES as u64 + 3) {
            scores.add_score(entry(i * 50, 1));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(50));
        assert_eq!(scores.add_score(entry(50, 1)), None);
    }

    #[test]
    fn test_persisted() {
        let mut storage = MemoryStorage::new();
        let mut scores = HighScores::new();
        scores.add_score(entry(150, 3));
        scores.save(&mut storage);
        let loaded = HighScores::load(&storage);
        assert_eq!(loaded.entries, scores.entries);
    }
}
