//! Session state and per-run data
//!
//! Everything the session needs to decide "is the run over" lives here.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_LEVEL_TIME;

/// Global session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    NotStarted,
    Init,
    /// Level loaded, waiting for the run to start
    Prepare,
    /// Active gameplay
    Started,
    Pause,
    Resume,
    /// Run ended, stats being processed
    Results,
    Quit,
    /// Dialog, choice or collection overlay in progress
    ContentDisplay,
}

/// Whether the simulation clock is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunningState {
    Paused,
    Running,
    #[default]
    Stopped,
}

/// Half of the play space new actors and items appear in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpawnZone {
    Left,
    #[default]
    Right,
}

impl SpawnZone {
    /// The other half of the field
    pub fn opposite(self) -> Self {
        match self {
            SpawnZone::Left => SpawnZone::Right,
            SpawnZone::Right => SpawnZone::Left,
        }
    }

    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            SpawnZone::Left => -1.0,
            SpawnZone::Right => 1.0,
        }
    }
}

/// Game mode; decides which conditions end a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Arcade,
    Challenge,
    /// Practice mode: the player cannot die, only the clock ends the run
    Training,
}

impl GameMode {
    /// Whether player health reaching zero ends the run
    pub fn health_ends_run(self) -> bool {
        match self {
            GameMode::Arcade | GameMode::Challenge => true,
            GameMode::Training => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Arcade => "arcade",
            GameMode::Challenge => "challenge",
            GameMode::Training => "training",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arcade" => Some(GameMode::Arcade),
            "challenge" => Some(GameMode::Challenge),
            "training" => Some(GameMode::Training),
            _ => None,
        }
    }
}

/// Modal content shown while the session is in `ContentDisplay`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentDisplay {
    #[default]
    Default,
    PlayerOutOfBounds,
    Choices,
    ChoicesOverview,
    ChoiceItemStart,
    ChoiceItemResult,
    Collect,
    CollectOverview,
    CollectItemStart,
    CollectItemResult,
}

impl ContentDisplay {
    pub fn code(&self) -> &'static str {
        match self {
            ContentDisplay::Default => "default",
            ContentDisplay::PlayerOutOfBounds => "content-game-player-out-of-bounds",
            ContentDisplay::Choices => "content-game-game-choices",
            ContentDisplay::ChoicesOverview => "content-game-game-choices-overview",
            ContentDisplay::ChoiceItemStart => "content-game-game-choices-item-start",
            ContentDisplay::ChoiceItemResult => "content-game-game-choices-item-result",
            ContentDisplay::Collect => "content-game-game-collect",
            ContentDisplay::CollectOverview => "content-game-game-collect-overview",
            ContentDisplay::CollectItemStart => "content-game-game-collect-item-start",
            ContentDisplay::CollectItemResult => "content-game-game-collect-item-result",
        }
    }

    /// Unknown codes map to `Default`
    pub fn from_code(code: &str) -> Self {
        const ALL: [ContentDisplay; 10] = [
            ContentDisplay::Default,
            ContentDisplay::PlayerOutOfBounds,
            ContentDisplay::Choices,
            ContentDisplay::ChoicesOverview,
            ContentDisplay::ChoiceItemStart,
            ContentDisplay::ChoiceItemResult,
            ContentDisplay::Collect,
            ContentDisplay::CollectOverview,
            ContentDisplay::CollectItemStart,
            ContentDisplay::CollectItemResult,
        ];
        ALL.into_iter()
            .find(|c| c.code() == code)
            .unwrap_or_default()
    }
}

/// Mutable per-run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSessionData {
    /// Seconds since the run started
    pub current_level_time: f64,
    /// Countdown, never below zero
    pub time_remaining: f64,
    pub coins: f64,
    pub score: f64,
    pub level_code: String,
    pub out_of_bounds: bool,
    /// Countdown restored by `reset_time_default`
    default_time: f64,
}

impl Default for RuntimeSessionData {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_TIME)
    }
}

impl RuntimeSessionData {
    pub fn new(default_time: f64) -> Self {
        Self {
            current_level_time: 0.0,
            time_remaining: default_time,
            coins: 0.0,
            score: 0.0,
            level_code: String::new(),
            out_of_bounds: false,
            default_time,
        }
    }

    /// Clear accumulators and restore the default countdown
    pub fn reset(&mut self) {
        *self = Self::new(self.default_time);
    }

    /// True once the countdown has run out
    pub fn time_expired(&self) -> bool {
        self.time_remaining <= 0.0
    }

    /// Count down by `delta`, clamping at zero. No-op once expired.
    pub fn subtract_time(&mut self, delta: f64) {
        if self.time_remaining > 0.0 {
            self.time_remaining = (self.time_remaining - delta).max(0.0);
            self.current_level_time += delta;
        }
    }

    pub fn reset_time_default(&mut self) {
        self.time_remaining = self.default_time;
    }

    pub fn reset_time(&mut self, time_to: f64) {
        self.time_remaining = time_to.max(0.0);
    }

    pub fn append_time(&mut self, time_append: f64) {
        self.time_remaining = (self.time_remaining + time_append).max(0.0);
    }
}

/// Health and score of the locally controlled player, fed by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRuntimeData {
    pub health: f32,
    pub score: f64,
}

impl Default for PlayerRuntimeData {
    fn default() -> Self {
        Self {
            health: 1.0,
            score: 0.0,
        }
    }
}
