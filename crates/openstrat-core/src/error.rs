//! Error types.

use thiserror::Error;

use crate::templates::AtlasCoords;
use crate::types::CellIdx;

/// Configuration errors. Always fatal: startup aborts and no partial world
/// is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("obstacle template not found: {0}")]
    MissingObstacleTemplate(String),

    #[error("unit template not found: {0}")]
    MissingUnitTemplate(String),

    #[error("no obstacle template for atlas {atlas_id} at {coords:?}")]
    UnknownAtlasCoords { atlas_id: i32, coords: AtlasCoords },

    #[error("malformed cell key: {0:?}")]
    MalformedCellKey(String),

    #[error("invalid map dimensions {width}x{height}")]
    InvalidMapSize { width: i32, height: i32 },

    #[error("invalid cell dimensions {width}x{height}")]
    InvalidCellSize { width: i32, height: i32 },

    #[error("map cell {0:?} lies outside the map")]
    CellOutsideMap(CellIdx),
}

/// Errors from spawning units onto the map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("cell {0:?} is outside the map")]
    OutOfBounds(CellIdx),

    #[error("cell {0:?} already holds a unit")]
    CellOccupied(CellIdx),

    #[error("unit template not found: {0}")]
    UnknownTemplate(String),
}
