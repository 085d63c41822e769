//! Level grid geometry and the sparse occupancy map
//!
//! Grid cells are addressed by index; occupancy is keyed by the truncated
//! world position of the cell, so two placements landing on the same spot
//! collide regardless of how they got there.

use std::collections::HashMap;
use std::fmt;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::placer::PlacedAsset;
use crate::error::{Error, Result};

/// Integer cell key, derived from a truncated world position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Truncate each coordinate toward zero
    pub fn from_world(pos: Vec3) -> Self {
        Self {
            x: pos.x as i32,
            y: pos.y as i32,
            z: pos.z as i32,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos-{}-{}-{}", self.x, self.y, self.z)
    }
}

/// Grid dimensions and candidate assets for level randomization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    /// Cell counts per axis
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Edge length of one cell in world units
    pub cell_size: f32,
    pub centered_x: bool,
    pub centered_y: bool,
    pub centered_z: bool,
    /// Candidate asset codes; duplicates weight the draw
    pub assets: Vec<String>,
}

impl Default for GridData {
    /// 45 x 1 x 30 cells of 4 units, centered on X/Z, ten barrels
    fn default() -> Self {
        let mut grid = Self::empty();
        grid.set_assets("barrel-1", 10);
        grid
    }
}

impl GridData {
    /// Default geometry with no candidate assets
    pub fn empty() -> Self {
        Self {
            width: 45,
            height: 1,
            depth: 30,
            cell_size: 4.0,
            centered_x: true,
            centered_y: false,
            centered_z: true,
            assets: Vec::new(),
        }
    }

    /// Resize with default cell size and centering
    pub fn reset_grid(&mut self, height: u32, width: u32, depth: u32) {
        self.reset_grid_full(height, width, depth, 4.0, true, false, true);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reset_grid_full(
        &mut self,
        height: u32,
        width: u32,
        depth: u32,
        cell_size: f32,
        center_x: bool,
        center_y: bool,
        center_z: bool,
    ) {
        self.height = height;
        self.width = width;
        self.depth = depth;
        self.cell_size = cell_size;
        self.centered_x = center_x;
        self.centered_y = center_y;
        self.centered_z = center_z;
    }

    pub fn set_assets(&mut self, code: &str, count: usize) {
        self.assets
            .extend(std::iter::repeat_n(code.to_string(), count));
    }

    /// Index inside the extent, or `InvalidGridPosition`
    pub fn checked_index(&self, x: i32, y: i32, z: i32) -> Result<IVec3> {
        let inside = |v: i32, extent: u32| v >= 0 && (v as i64) < extent as i64;
        if inside(x, self.width) && inside(y, self.height) && inside(z, self.depth) {
            Ok(IVec3::new(x, y, z))
        } else {
            Err(Error::InvalidGridPosition { x, y, z })
        }
    }

    /// Clamp an index to the nearest valid cell
    pub fn clamp_index(&self, x: i32, y: i32, z: i32) -> IVec3 {
        let clamp = |v: i32, extent: u32| v.clamp(0, extent.saturating_sub(1) as i32);
        IVec3::new(
            clamp(x, self.width),
            clamp(y, self.height),
            clamp(z, self.depth),
        )
    }

    /// World position of a cell: `cell_size * index`, shifted by half the
    /// extent on centered axes
    pub fn world_position(&self, index: IVec3) -> Vec3 {
        let axis = |i: i32, extent: u32, centered: bool| {
            let pos = self.cell_size * i as f32;
            if centered {
                pos - (extent as f32 * self.cell_size) / 2.0
            } else {
                pos
            }
        };
        Vec3::new(
            axis(index.x, self.width, self.centered_x),
            axis(index.y, self.height, self.centered_y),
            axis(index.z, self.depth, self.centered_z),
        )
    }
}

/// Sparse cell occupancy map
#[derive(Debug, Clone, Default)]
pub struct SpatialGridRegistry {
    cells: HashMap<CellKey, PlacedAsset>,
}

impl SpatialGridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self, key: CellKey) -> bool {
        self.cells.contains_key(&key)
    }

    /// Upsert the asset occupying a cell
    pub fn set_filled(&mut self, key: CellKey, asset: PlacedAsset) {
        log::trace!("set filled: {}", key);
        self.cells.insert(key, asset);
    }

    /// Insert only into an empty cell
    pub fn try_fill(&mut self, key: CellKey, asset: PlacedAsset) -> Result<()> {
        if self.is_filled(key) {
            return Err(Error::DuplicatePlacement { key });
        }
        self.set_filled(key, asset);
        Ok(())
    }

    pub fn get(&self, key: CellKey) -> Option<&PlacedAsset> {
        self.cells.get(&key)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
