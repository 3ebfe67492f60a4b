//! Elevation line of sight.
//!
//! A sightline runs from the top-center of the observer's cell column to the
//! top-center of the target's. A cell in between blocks when the segment
//! passes through its column, inset slightly so grazing contact is clear.

use hecs::World;

use openstrat_core::constants::LOS_BOX_INSET;
use openstrat_core::types::CellIdx;

use crate::collision::{column_top, ray_box_intersection, Aabb, Ray};
use crate::elevation::Elevation;
use crate::geometry::{cell_center, cells_overlapping_line, chebyshev_distance};
use crate::map::GameMap;

/// Does `between` block the sightline from `observer` to `target`?
///
/// Returns `Some(between)` when it does. Adjacent cells always see each
/// other, the observer's own cell never blocks, and off-map or zero-height
/// cells never block.
pub fn has_elevation_los(
    world: &World,
    map: &GameMap,
    observer: CellIdx,
    target: CellIdx,
    between: CellIdx,
) -> Option<CellIdx> {
    if chebyshev_distance(observer, target) <= 1 || between == observer {
        return None;
    }
    let q = map.query(between);
    if !q.in_bounds {
        return None;
    }

    let elev = Elevation::new(world, map);
    let blocker_height = elev.total_height(q);
    if blocker_height <= 0 {
        return None;
    }

    let dims = map.dims();
    let from = column_top(observer, dims, elev.total_height(map.query(observer)) as f32);
    let to = column_top(target, dims, elev.total_height(map.query(target)) as f32);
    let (ray, length) = Ray::between(from, to);

    let column = Aabb::cell_column(between, dims, blocker_height as f32).inset(LOS_BOX_INSET);
    match ray_box_intersection(&ray, &column) {
        Some(t) if t <= length => Some(between),
        _ => None,
    }
}

/// Cells the sightline from `from` to `to` crosses, excluding `from` itself.
pub fn sightline_cells(map: &GameMap, from: CellIdx, to: CellIdx) -> Vec<CellIdx> {
    let dims = map.dims();
    cells_overlapping_line(cell_center(from, dims), cell_center(to, dims), dims)
        .into_iter()
        .filter(|c| *c != from)
        .collect()
}

/// First cell along the sightline that blocks it, if any.
pub fn first_blocking_cell(
    world: &World,
    map: &GameMap,
    from: CellIdx,
    to: CellIdx,
) -> Option<CellIdx> {
    sightline_cells(map, from, to)
        .into_iter()
        .find_map(|cell| has_elevation_los(world, map, from, to, cell))
}
