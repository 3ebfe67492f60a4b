//! Grid system for OpenStrat.
//!
//! Geometry kernel, cell index, height composition
//! and elevation line of sight.

pub use openstrat_core as core;

pub mod collision;
pub mod elevation;
pub mod geometry;
pub mod los;
pub mod map;

// Re-export key types for convenience.
pub use elevation::{CellSummary, Elevation};
pub use los::{first_blocking_cell, has_elevation_los, sightline_cells};
pub use map::{CellQuery, GameMap, Occupants, TerrainStep};
