//! Player preferences
//!
//! Persisted separately from the high score. A difficulty picked in the
//! menu decides how much each point speeds the player up; with no pick the
//! tuning's own increment stands.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError, Store};
use crate::tuning::{Difficulty, Tuning};

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected difficulty, if the player ever chose one
    pub difficulty: Option<Difficulty>,
    /// Explicit per-point speed increment; wins over the difficulty preset
    pub speed_inc_override: Option<f32>,
}

impl Settings {
    /// Store key
    const STORAGE_KEY: &'static str = "settings";

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty: Some(difficulty),
            ..Self::default()
        }
    }

    /// Speed increment per point chosen by the player, if any
    pub fn speed_inc_per_point(&self) -> Option<f32> {
        self.speed_inc_override
            .or_else(|| self.difficulty.map(|d| d.speed_inc_per_point()))
    }

    /// Fold the preferences into a tuning set
    pub fn apply(&self, mut tuning: Tuning) -> Tuning {
        if let Some(amount) = self.speed_inc_per_point() {
            tuning.progression.speed_inc_per_point = amount;
        }
        tuning
    }

    /// Display name of the selected difficulty
    pub fn difficulty_name(&self) -> &'static str {
        self.difficulty.map_or("configured", |d| d.as_str())
    }

    /// Load settings; missing or unreadable settings fall back to defaults
    pub fn load(store: &dyn Store) -> Self {
        match persistence::load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings ({})", settings.difficulty_name());
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

    pub fn save(&self, store: &mut dyn Store) -> Result<(), PersistenceError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
