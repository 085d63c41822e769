//! Player stat totals and highs
//!
//! Persisted as JSON alongside the settings file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::StatsTracker;

/// Stat codes written at the end of a run
pub mod codes {
    pub const SCORE: &str = "score";
    pub const COINS: &str = "coins";
    pub const TIME_PLAYED: &str = "time-played";
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats io: {0}")]
    Io(#[from] std::io::Error),
    #[error("stats format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Per-level start/finish counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub started: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelStats {
    pub totals: BTreeMap<String, f64>,
    pub highs: BTreeMap<String, f64>,
    pub levels: BTreeMap<String, LevelProgress>,
}

impl LevelStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load stats, starting fresh when the file is missing or broken
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(stats) => {
                log::info!("Loaded {} stat totals", stats.totals.len());
                stats
            }
            Err(e) => {
                log::info!("No stats found, starting fresh ({})", e);
                Self::new()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, StatsError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StatsError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Stats saved ({} totals)", self.totals.len());
        Ok(())
    }

    pub fn progress(&self, level_code: &str) -> LevelProgress {
        self.levels.get(level_code).copied().unwrap_or_default()
    }
}

impl StatsTracker for LevelStats {
    fn set_stat_total(&mut self, code: &str, value: f64) {
        *self.totals.entry(code.to_string()).or_insert(0.0) += value;
    }

    fn set_stat_high(&mut self, code: &str, value: f64) {
        let high = self.highs.entry(code.to_string()).or_insert(value);
        if value > *high {
            *high = value;
        }
    }

    fn start_level(&mut self, level_code: &str) {
        self.levels.entry(level_code.to_string()).or_default().started += 1;
    }

    fn end_level(&mut self, level_code: &str) {
        self.levels.entry(level_code.to_string()).or_default().completed += 1;
    }

    fn total(&self, code: &str) -> Option<f64> {
        self.totals.get(code).copied()
    }

    fn high(&self, code: &str) -> Option<f64> {
        self.highs.get(code).copied()
    }
}
