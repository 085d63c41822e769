//! Level content: grid occupancy, play bounds and randomized placement

pub mod bounds;
pub mod grid;
pub mod placer;

pub use bounds::GameBounds;
pub use grid::{CellKey, GridData, SpatialGridRegistry};
pub use placer::{
    GridFill, LevelAssetPlacer, PhysicsType, PlacedAsset, PlacementRule, PlacementStep,
};
