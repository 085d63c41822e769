//! Goalzone - session director for a zone-based 3D arena game
//!
//! Core modules:
//! - `sim`: Run state, session enums and the cooperative scheduler
//! - `level`: Grid registry, game bounds and the level asset placer
//! - `audio`: Music channel sequencing and throttled sound effects
//! - `session`: The session state machine driving everything else
//! - `spawn`: Multi-step actor/item spawning
//! - `host`: Traits for engine collaborators plus headless implementations

pub mod audio;
pub mod camera;
pub mod choice;
pub mod damage;
pub mod error;
pub mod events;
pub mod host;
pub mod hud;
pub mod level;
pub mod roster;
pub mod session;
pub mod settings;
pub mod sim;
pub mod spawn;
pub mod stats;

pub use error::{Error, Result};
pub use session::{Session, SessionLifecycle};
pub use settings::{SessionTuning, Settings};
pub use stats::LevelStats;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Default countdown for a level run (seconds)
    pub const DEFAULT_LEVEL_TIME: f64 = 90.0;
    /// Delay between entering Started and activating the AI/item directors
    pub const DIRECTORS_DELAY: f64 = 6.0;
    /// Delay between the game-over latch and the Results transition
    pub const RESULTS_DELAY: f64 = 0.5;
    /// Delay before an out-of-bounds dialog turns into a game over
    pub const OUT_OF_BOUNDS_DELAY: f64 = 3.0;
    /// Delay between entering Results and writing stat totals
    pub const STATS_DELAY: f64 = 0.5;
    /// Delay before the results panel is shown once stats are processed
    pub const ADVANCE_TO_RESULTS_DELAY: f64 = 0.5;

    /// Music fades (seconds)
    pub const UI_INTRO_FADE_IN: f32 = 2.0;
    pub const UI_LOOP_FADE_IN: f32 = 1.7;
    pub const GAME_LOOP_FADE_IN: f32 = 2.0;
    pub const UI_FADE_OUT: f32 = 1.5;
    pub const GAME_FADE_OUT: f32 = 1.3;

    /// Zoned actor spawn: fixed lateral offset, random depth
    pub const ACTOR_ZONE_X: f32 = 80.0;
    pub const ZONE_DEPTH_HALF: f32 = 20.0;
    /// Zoned item spawn: lateral band and drop height
    pub const ITEM_ZONE_X_MIN: f32 = 10.0;
    pub const ITEM_ZONE_X_MAX: f32 = 80.0;
    pub const ITEM_DROP_HEIGHT: f32 = 30.0;
    /// Unzoned spawn window half-size around the player
    pub const PLAYER_SPAWN_WINDOW: f32 = 50.0;

    /// Resource path prefixes
    pub const CHARACTER_PREFABS: &str = "Prefabs/Characters";
    pub const LEVEL_ITEM_PREFABS: &str = "Prefabs/LevelItems";
    pub const LEVEL_ASSET_PREFABS: &str = "Prefabs/LevelAssets";

    /// Per-mille chance a grid cell receives an asset
    pub const GRID_FILL_PER_MILLE: u32 = 15;
    /// Maximum assets stacked on one filled grid column
    pub const GRID_MAX_STACK: u32 = 3;

    /// Seconds before a choice object reports its answer
    pub const CHOICE_BROADCAST_DELAY: f64 = 2.0;
    /// Camera rotation tween duration (seconds)
    pub const CAMERA_TWEEN: f32 = 2.0;
}

/// Uniform draw in `[min, max]`; collapses to `min` on an empty or inverted range
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Join a resource prefix and a prefab code
#[inline]
pub fn resource_path(prefix: &str, code: &str) -> String {
    format!("{prefix}/{code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_uniform_degenerate_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 1.0, 1.0), 1.0);
        assert_eq!(uniform(&mut rng, 2.0, -2.0), 2.0);
        let v = uniform(&mut rng, -0.1, 0.1);
        assert!((-0.1..=0.1).contains(&v));
    }

    #[test]
    fn test_resource_path() {
        assert_eq!(
            resource_path(consts::CHARACTER_PREFABS, "GameEnemyBot1"),
            "Prefabs/Characters/GameEnemyBot1"
        );
    }
}
