//! Player preferences
//!
//! Persisted separately from progress through `Storage`.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::{Storage, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Let the assist policy steer instead of manual input
    pub assist_mode: bool,
    /// Honour attention signals from the camera classifier
    pub camera_enabled: bool,
    /// Publish a render snapshot every N ticks
    pub snapshot_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assist_mode: false,
            camera_enabled: false,
            snapshot_interval: 2,
        }
    }
}

impl Settings {
    /// Snapshot interval, never zero
    pub fn effective_snapshot_interval(&self) -> u64 {
        self.snapshot_interval.max(1) as u64
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match load_json::<Settings>(storage, SETTINGS_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        match save_json(storage, SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_zero_interval_treated_as_one() {
        let settings = Settings {
            snapshot_interval: 0,
            ..Default::default()
        };
        assert_eq!(settings.effective_snapshot_interval(), 1);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(SETTINGS_KEY, r#"{ "assist_mode": true }"#).unwrap();
        let settings = Settings::load(&storage);
        assert!(settings.assist_mode);
        assert_eq!(settings.snapshot_interval, 2);
    }

    #[test]
    fn test_roundtrip() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            camera_enabled: true,
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }
}
