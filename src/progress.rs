//! Level unlock frontier
//!
//! Persisted through `Storage`. Only ever grows.

use serde::{Deserialize, Serialize};

use crate::consts::PROGRESS_KEY;
use crate::persistence::{Storage, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockProgress {
    /// Highest level id the player may select
    pub highest_unlocked: u32,
}

impl Default for UnlockProgress {
    fn default() -> Self {
        Self {
            highest_unlocked: 1,
        }
    }
}

impl UnlockProgress {
    pub fn is_unlocked(&self, level_id: u32) -> bool {
        level_id >= 1 && level_id <= self.highest_unlocked
    }

    /// Record a completed level. The frontier advances by one only when the
    /// frontier level itself was completed, and never past `max_level`.
    /// Returns true if the frontier moved.
    pub fn record_completion(&mut self, level_id: u32, max_level: u32) -> bool {
        if level_id == self.highest_unlocked && level_id < max_level {
            self.highest_unlocked += 1;
            return true;
        }
        false
    }

    /// Load saved progress, falling back to a fresh start
    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<UnlockProgress>(storage, PROGRESS_KEY) {
            Ok(Some(progress)) => {
                log::info!("Loaded progress: {} level(s) unlocked", progress.highest_unlocked);
                progress.at_least(Self::default())
            }
            Ok(None) => {
                log::info!("No saved progress, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable progress: {}", e);
                Self::default()
            }
        }
    }

    /// Persist progress; failures are logged and otherwise ignored
    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, PROGRESS_KEY, self) {
            Ok(()) => log::info!("Progress saved ({} unlocked)", self.highest_unlocked),
            Err(e) => log::warn!("Failed to save progress: {}", e),
        }
    }

    fn at_least(self, other: Self) -> Self {
        Self {
            highest_unlocked: self.highest_unlocked.max(other.highest_unlocked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    #[test]
    fn test_frontier_advances_once() {
        let mut progress = UnlockProgress::default();
        assert!(progress.record_completion(1, 5));
        assert_eq!(progress.highest_unlocked, 2);
        // Replaying an earlier level does nothing
        assert!(!progress.record_completion(1, 5));
        assert_eq!(progress.highest_unlocked, 2);
    }

    #[test]
    fn test_frontier_capped_at_last_level() {
        let mut progress = UnlockProgress {
            highest_unlocked: 5,
        };
        assert!(!progress.record_completion(5, 5));
        assert_eq!(progress.highest_unlocked, 5);
    }

    #[test]
    fn test_load_save() {
        let mut storage = MemoryStorage::new();
        assert_eq!(UnlockProgress::load(&storage), UnlockProgress::default());
        UnlockProgress {
            highest_unlocked: 3,
        }
        .save(&mut storage);
        assert_eq!(UnlockProgress::load(&storage).highest_unlocked, 3);
    }

    #[test]
    fn test_corrupt_progress_falls_back() {
        let mut storage = MemoryStorage::new();
        storage.set(PROGRESS_KEY, "garbage").unwrap();
        assert_eq!(UnlockProgress::load(&storage), UnlockProgress::default());
    }

    #[test]
    fn test_zero_frontier_is_repaired() {
        let mut storage = MemoryStorage::new();
        storage.set(PROGRESS_KEY, "{\"highest_unlocked\":0}").unwrap();
        assert_eq!(UnlockProgress::load(&storage).highest_unlocked, 1);
    }

    proptest! {
        #[test]
        fn prop_never_decreases(completions in prop::collection::vec(0u32..8, 0..50)) {
            let mut progress = UnlockProgress::default();
            for level in completions {
                let before = progress.highest_unlocked;
                progress.record_completion(level, 5);
                prop_assert!(progress.highest_unlocked >= before);
                prop_assert!(progress.highest_unlocked <= 5);
            }
        }
    }
}
