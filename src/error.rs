//! Gameplay error types
//!
//! Every variant here is recoverable and local: components log it and carry on.
//! The worst outcome is a missing object, a silent sound or a skipped placement.

use thiserror::Error;

use crate::level::CellKey;
use crate::sim::SessionState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Requested prefab or clip is not in the resource store
    #[error("resource not found: {path}")]
    MissingResource { path: String },

    /// A grid index fell outside the grid extent and was clamped
    #[error("grid index ({x}, {y}, {z}) outside extent, clamped")]
    InvalidGridPosition { x: i32, y: i32, z: i32 },

    /// The target cell already holds an asset
    #[error("grid cell {key} already filled")]
    DuplicatePlacement { key: CellKey },

    /// The request would not change anything
    #[error("redundant transition while in {state:?}")]
    RedundantTransition { state: SessionState },
}
