//! Game settings and preferences
//!
//! Persisted as JSON next to the player profile. A missing or unreadable file
//! falls back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    DEFAULT_LEVEL_TIME, DIRECTORS_DELAY, GRID_FILL_PER_MILLE, GRID_MAX_STACK,
    OUT_OF_BOUNDS_DELAY, RESULTS_DELAY,
};
use crate::host::ProfileStore;
use crate::level::GridFill;
use crate::sim::GameMode;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Gameplay knobs for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub mode: GameMode,
    /// Countdown for a run (seconds)
    pub default_level_time: f64,
    pub directors_delay: f64,
    pub results_delay: f64,
    pub out_of_bounds_delay: f64,

    // === Level generation ===
    /// Chance per grid cell, out of 1000
    pub grid_fill_per_mille: u32,
    pub grid_max_stack: u32,
    /// Seed for level layout and spawn positions
    pub seed: u64,

    // === Flow ===
    /// Spawn in the goal-zone halves rather than around the player
    pub zoned_spawns: bool,
    /// Show the edit affordance when a level is prepared
    pub allow_editing: bool,
    /// Go straight from Prepare to Started
    pub auto_start_on_prepare: bool,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            mode: GameMode::Arcade,
            default_level_time: DEFAULT_LEVEL_TIME,
            directors_delay: DIRECTORS_DELAY,
            results_delay: RESULTS_DELAY,
            out_of_bounds_delay: OUT_OF_BOUNDS_DELAY,

            grid_fill_per_mille: GRID_FILL_PER_MILLE,
            grid_max_stack: GRID_MAX_STACK,
            seed: 0,

            zoned_spawns: true,
            allow_editing: false,
            auto_start_on_prepare: true,
        }
    }
}

impl SessionTuning {
    pub fn grid_fill(&self) -> GridFill {
        GridFill {
            fill_per_mille: self.grid_fill_per_mille,
            max_stack: self.grid_max_stack,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: SessionTuning,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: SessionTuning::default(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    fn effective(&self, volume: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * volume).clamp(0.0, 1.0)
        }
    }
}

impl ProfileStore for Settings {
    fn effects_volume(&self) -> f32 {
        self.effective(self.sfx_volume)
    }

    fn music_volume(&self) -> f32 {
        self.effective(self.music_volume)
    }
}
