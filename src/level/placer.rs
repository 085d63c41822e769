//! Random level asset placement
//!
//! Two sources feed a level: the grid pass (`randomize_grid`), which rolls
//! every cell and stacks a few assets where the roll hits, and the rule pass
//! (`randomize_rules`), which scatters a requested count of each rule's asset
//! inside the play bounds. Only grid placements are registered by cell.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::GameBounds;
use super::grid::{CellKey, GridData, SpatialGridRegistry};
use crate::consts::{GRID_FILL_PER_MILLE, GRID_MAX_STACK};
use crate::sim::SpawnZone;
use crate::uniform;

/// How the physics collaborator should treat a placed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhysicsType {
    #[default]
    Static,
    /// Static until the level starts, then simulated
    ReactiveOnStart,
    Kinematic,
}

/// Describes how to scatter one kind of asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    pub asset_code: String,
    /// Number of `code-N` variants; 0 means the code is used as is
    pub count_limit: u32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Degrees about Z
    pub rotation_min: f32,
    pub rotation_max: f32,
    pub physics: PhysicsType,
    pub destructible: bool,
    pub reactive: bool,
    pub kinematic: bool,
    pub gravity: bool,
    /// Inclusive count request for the rule pass
    pub count_min: u32,
    pub count_max: u32,
}

impl PlacementRule {
    /// Unscaled, unrotated, a single copy
    pub fn new(asset_code: &str) -> Self {
        Self {
            asset_code: asset_code.to_string(),
            count_limit: 0,
            scale_min: 1.0,
            scale_max: 1.0,
            rotation_min: 0.0,
            rotation_max: 0.0,
            physics: PhysicsType::Static,
            destructible: false,
            reactive: false,
            kinematic: false,
            gravity: false,
            count_min: 1,
            count_max: 1,
        }
    }

    /// Rule used for grid cells: static, gravity on
    pub fn grid_cell(asset_code: &str) -> Self {
        Self {
            gravity: true,
            ..Self::new(asset_code)
        }
    }

    /// Default rule-pass population for a fresh level: static, destructible
    /// portals and boxes with a slight tilt
    pub fn level_defaults() -> Vec<PlacementRule> {
        let base = |asset_code: &str, count_limit: u32| PlacementRule {
            count_limit,
            scale_min: 0.7,
            scale_max: 1.2,
            rotation_min: -0.1,
            rotation_max: 0.1,
            physics: PhysicsType::Static,
            destructible: true,
            kinematic: true,
            gravity: true,
            ..Self::new(asset_code)
        };
        vec![base("portal", 5).with_count(3, 9), base("box", 3).with_count(5, 20)]
    }

    pub fn with_count(mut self, min: u32, max: u32) -> Self {
        self.count_min = min;
        self.count_max = max.max(min);
        self
    }
}

/// One position/rotation/scale triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementStep {
    pub position: Vec3,
    /// Euler degrees
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl PlacementStep {
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }
}

/// A resolved placement, ready for the world collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAsset {
    pub asset_code: String,
    pub steps: Vec<PlacementStep>,
    pub physics: PhysicsType,
    pub destructible: bool,
    pub reactive: bool,
    pub kinematic: bool,
    pub gravity: bool,
}

impl PlacedAsset {
    /// A bare asset at the origin
    pub fn named(asset_code: &str) -> Self {
        Self {
            asset_code: asset_code.to_string(),
            steps: vec![PlacementStep {
                position: Vec3::ZERO,
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
            }],
            physics: PhysicsType::Static,
            destructible: false,
            reactive: false,
            kinematic: false,
            gravity: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.steps.first().map(|s| s.position).unwrap_or(Vec3::ZERO)
    }
}

/// Grid pass density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFill {
    /// Chance per cell, out of 1000
    pub fill_per_mille: u32,
    /// Tallest stack a hit cell may get
    pub max_stack: u32,
}

impl Default for GridFill {
    fn default() -> Self {
        Self {
            fill_per_mille: GRID_FILL_PER_MILLE,
            max_stack: GRID_MAX_STACK,
        }
    }
}

/// Produces the placed-asset list for a level
#[derive(Debug, Clone)]
pub struct LevelAssetPlacer {
    registry: SpatialGridRegistry,
    placed: Vec<PlacedAsset>,
    rng: Pcg32,
    bounds: Option<GameBounds>,
    zone: Option<SpawnZone>,
    fill: GridFill,
}

impl LevelAssetPlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            registry: SpatialGridRegistry::new(),
            placed: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            bounds: None,
            zone: None,
            fill: GridFill::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: GameBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_fill(mut self, fill: GridFill) -> Self {
        self.fill = fill;
        self
    }

    pub fn set_bounds(&mut self, bounds: Option<GameBounds>) {
        self.bounds = bounds;
    }

    /// Restrict `place_random` to one half of the bounds
    pub fn set_zone(&mut self, zone: Option<SpawnZone>) {
        self.zone = zone;
    }

    pub fn registry(&self) -> &SpatialGridRegistry {
        &self.registry
    }

    pub fn placed(&self) -> &[PlacedAsset] {
        &self.placed
    }

    /// Drop everything from the previous level
    pub fn clear(&mut self) {
        self.registry.clear();
        self.placed.clear();
    }

    /// Uniform point in the bounds (or the zone half); origin without bounds
    pub fn random_position(&mut self) -> Vec3 {
        match (self.bounds, self.zone) {
            (Some(bounds), Some(zone)) => bounds.zone(zone).random_point(&mut self.rng),
            (Some(bounds), None) => bounds.random_point(&mut self.rng),
            (None, _) => Vec3::ZERO,
        }
    }

    /// Resolve a rule at a random position
    pub fn place_random(&mut self, rule: &PlacementRule) -> PlacedAsset {
        let position = self.random_position();
        self.place_at(rule, position)
    }

    /// Resolve a rule at a fixed position, drawing scale, rotation and variant
    pub fn place_at(&mut self, rule: &PlacementRule, position: Vec3) -> PlacedAsset {
        let scale = Vec3::splat(uniform(&mut self.rng, rule.scale_min, rule.scale_max));
        let rotation = Vec3::new(
            0.0,
            0.0,
            uniform(&mut self.rng, rule.rotation_min, rule.rotation_max),
        );

        let asset_code = if rule.count_limit > 0 {
            let variant = if rule.count_limit > 1 {
                self.rng.random_range(1..rule.count_limit)
            } else {
                1
            };
            format!("{}-{}", rule.asset_code, variant)
        } else {
            rule.asset_code.clone()
        };

        PlacedAsset {
            asset_code,
            steps: vec![PlacementStep {
                position,
                rotation,
                scale,
            }],
            physics: rule.physics,
            destructible: rule.destructible,
            reactive: rule.reactive,
            kinematic: rule.kinematic,
            gravity: rule.gravity,
        }
    }

    /// Commit a placement only into a free cell. Returns whether it landed.
    pub fn sync_placement(&mut self, key: CellKey, rule: &PlacementRule, position: Vec3) -> bool {
        if self.registry.is_filled(key) {
            log::trace!("cell {} taken, dropping {}", key, rule.asset_code);
            return false;
        }
        let asset = self.place_at(rule, position);
        match self.registry.try_fill(key, asset.clone()) {
            Ok(()) => {
                self.placed.push(asset);
                true
            }
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }

    /// Roll every cell of the grid and stack assets where the roll hits
    pub fn randomize_grid(&mut self, grid: &GridData) -> &[PlacedAsset] {
        self.clear();
        if grid.assets.is_empty() {
            return &self.placed;
        }

        for z in 0..grid.depth as i32 {
            for y in 0..grid.height as i32 {
                for x in 0..grid.width as i32 {
                    let roll = self.rng.random_range(0..1000u32);
                    if roll >= self.fill.fill_per_mille {
                        continue;
                    }

                    let pick = self.rng.random_range(0..grid.assets.len());
                    let rule = PlacementRule::grid_cell(&grid.assets[pick]);
                    let stack = self.rng.random_range(1..=self.fill.max_stack.max(1));

                    for level in 0..stack as i32 {
                        let index = match grid.checked_index(x, y + level, z) {
                            Ok(index) => index,
                            Err(e) => {
                                log::trace!("{}, clamping", e);
                                grid.clamp_index(x, y + level, z)
                            }
                        };
                        let position = grid.world_position(index);
                        self.sync_placement(CellKey::from_world(position), &rule, position);
                    }
                }
            }
        }

        log::debug!(
            "grid {}x{}x{} placed {} assets",
            grid.width,
            grid.height,
            grid.depth,
            self.placed.len()
        );
        &self.placed
    }

    /// Scatter each rule's requested count inside the bounds.
    /// Appends to the placed list and returns how many were added.
    pub fn randomize_rules(&mut self, rules: &[PlacementRule]) -> usize {
        let before = self.placed.len();
        for rule in rules {
            let count = if rule.count_max > rule.count_min {
                self.rng.random_range(rule.count_min..=rule.count_max)
            } else {
                rule.count_min
            };
            for _ in 0..count {
                let asset = self.place_random(rule);
                self.placed.push(asset);
            }
        }
        self.placed.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BoundsProvider;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn field() -> GameBounds {
        GameBounds::new(Vec3::new(-100.0, 0.0, -50.0), Vec3::new(100.0, 40.0, 50.0))
    }

    #[test]
    fn test_no_bounds_places_at_origin() {
        let mut placer = LevelAssetPlacer::new(1);
        let asset = placer.place_random(&PlacementRule::new("cone"));
        assert_eq!(asset.position(), Vec3::ZERO);
        assert_eq!(asset.asset_code, "cone");
    }

    #[test]
    fn test_place_random_ranges() {
        let mut placer = LevelAssetPlacer::new(7).with_bounds(field());
        let rule = PlacementRule {
            count_limit: 5,
            scale_min: 0.5,
            scale_max: 2.0,
            rotation_min: -30.0,
            rotation_max: 30.0,
            ..PlacementRule::new("portal")
        };
        for _ in 0..100 {
            let asset = placer.place_random(&rule);
            let step = asset.steps[0];
            assert!(field().check_bounds(step.position));
            assert!(step.scale.cmpge(Vec3::splat(0.5)).all());
            assert!(step.scale.cmple(Vec3::splat(2.0)).all());
            assert_eq!(step.scale, Vec3::splat(step.scale.x));
            assert!((-30.0..=30.0).contains(&step.rotation.z));
            let variant: u32 = asset
                .asset_code
                .strip_prefix("portal-")
                .and_then(|v| v.parse().ok())
                .unwrap();
            assert!((1..5).contains(&variant));
        }
    }

    #[test]
    fn test_count_limit_one_yields_suffix_one() {
        let mut placer = LevelAssetPlacer::new(2);
        let rule = PlacementRule {
            count_limit: 1,
            ..PlacementRule::new("box")
        };
        assert_eq!(placer.place_random(&rule).asset_code, "box-1");
    }

    #[test]
    fn test_zoned_placement_uses_half() {
        let mut placer = LevelAssetPlacer::new(9).with_bounds(field());
        placer.set_zone(Some(SpawnZone::Left));
        for _ in 0..50 {
            assert!(placer.random_position().x <= 0.0);
        }
        placer.set_zone(Some(SpawnZone::Right));
        for _ in 0..50 {
            assert!(placer.random_position().x >= 0.0);
        }
    }

    #[test]
    fn test_sync_placement_drops_duplicate() {
        let mut placer = LevelAssetPlacer::new(3);
        let rule = PlacementRule::grid_cell("barrel-1");
        let key = CellKey::new(4, 0, 4);
        assert!(placer.sync_placement(key, &rule, Vec3::new(4.0, 0.0, 4.0)));
        assert!(!placer.sync_placement(key, &rule, Vec3::new(4.0, 0.0, 4.0)));
        assert_eq!(placer.placed().len(), 1);
        assert_eq!(placer.registry().len(), 1);
    }

    #[test]
    fn test_randomize_grid_resets_between_calls() {
        let mut placer = LevelAssetPlacer::new(11).with_fill(GridFill {
            fill_per_mille: 1000,
            max_stack: 1,
        });
        let mut grid = GridData::default();
        grid.reset_grid(1, 3, 2);

        let first = placer.randomize_grid(&grid).len();
        assert_eq!(first, 6);
        let second = placer.randomize_grid(&grid).len();
        assert_eq!(second, 6);
        assert_eq!(placer.registry().len(), 6);
    }

    #[test]
    fn test_stack_clamps_to_top_cell() {
        // Height 1: any stack collapses onto the single layer
        let mut placer = LevelAssetPlacer::new(5).with_fill(GridFill {
            fill_per_mille: 1000,
            max_stack: 3,
        });
        let mut grid = GridData::default();
        grid.reset_grid(1, 1, 1);
        assert_eq!(placer.randomize_grid(&grid).len(), 1);
    }

    #[test]
    fn test_stack_grows_upward() {
        let mut placer = LevelAssetPlacer::new(5).with_fill(GridFill {
            fill_per_mille: 1000,
            max_stack: 1,
        });
        let mut grid = GridData::default();
        grid.reset_grid(3, 1, 1);
        let placed = placer.randomize_grid(&grid);
        let ys: Vec<f32> = placed.iter().map(|a| a.position().y).collect();
        assert_eq!(ys, vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn test_randomize_rules_counts() {
        let mut placer = LevelAssetPlacer::new(13).with_bounds(field());
        let rules = vec![
            PlacementRule::new("cone").with_count(2, 2),
            PlacementRule::new("flag").with_count(3, 6),
        ];
        let added = placer.randomize_rules(&rules);
        assert!((5..=8).contains(&added));
        assert_eq!(placer.placed().len(), added);
        // Rule placements are not cell-registered
        assert!(placer.registry().is_empty());
    }

    #[test]
    fn test_level_defaults_population() {
        let rules = PlacementRule::level_defaults();
        let codes: Vec<_> = rules.iter().map(|r| r.asset_code.as_str()).collect();
        assert_eq!(codes, ["portal", "box"]);
        assert_eq!((rules[0].count_min, rules[0].count_max), (3, 9));
        assert_eq!((rules[1].count_min, rules[1].count_max), (5, 20));
        for rule in &rules {
            assert_eq!(rule.physics, PhysicsType::Static);
            assert!(rule.destructible && rule.kinematic && rule.gravity);
            assert!(!rule.reactive);
            assert_eq!((rule.rotation_min, rule.rotation_max), (-0.1, 0.1));
        }

        let mut placer = LevelAssetPlacer::new(21).with_bounds(field());
        let placed = placer.randomize_rules(&rules);
        assert!((8..=29).contains(&placed));
        for asset in placer.placed() {
            let step = asset.steps[0];
            assert_eq!(step.scale, Vec3::splat(step.scale.x));
            assert!((-0.1..=0.1).contains(&step.rotation.z));
            assert_eq!(asset.physics, PhysicsType::Static);
            assert!(asset.destructible && asset.kinematic);
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let grid = GridData::default();
        let mut a = LevelAssetPlacer::new(42).with_bounds(field());
        let mut b = LevelAssetPlacer::new(42).with_bounds(field());
        assert_eq!(a.randomize_grid(&grid), b.randomize_grid(&grid));
        let rules = PlacementRule::level_defaults();
        a.randomize_rules(&rules);
        b.randomize_rules(&rules);
        assert_eq!(a.placed(), b.placed());
    }

    proptest! {
        #[test]
        fn prop_grid_cells_unique(seed in any::<u64>(), per_mille in 0u32..1000, stack in 1u32..4) {
            let mut placer = LevelAssetPlacer::new(seed).with_fill(GridFill {
                fill_per_mille: per_mille,
                max_stack: stack,
            });
            let mut grid = GridData::default();
            grid.reset_grid(2, 12, 8);
            let placed = placer.randomize_grid(&grid).to_vec();

            let keys: HashSet<CellKey> = placed
                .iter()
                .map(|a| CellKey::from_world(a.position()))
                .collect();
            prop_assert_eq!(keys.len(), placed.len());
            prop_assert_eq!(placer.registry().len(), placed.len());
        }
    }
}
