//! GameMap: the spatial index from cells to the entities occupying them.
//!
//! A cell holds at most one obstacle and at most one unit. The map stores
//! entity handles only; component data lives in the hecs `World`.

use std::collections::HashMap;

use hecs::Entity;

use openstrat_core::types::{CellDims, CellIdx, Rect};

use crate::geometry::{cell_rect, cells_overlapping_rect};

/// A cell plus whether it lies on the map. Height and LOS queries take
/// one of these so out-of-bounds cells resolve to empty without panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellQuery {
    pub cell: CellIdx,
    pub in_bounds: bool,
}

/// Entities indexed at one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupants {
    pub unit: Option<Entity>,
    pub obstacle: Option<Entity>,
}

/// Terrain level change contributed by a cell's obstacle during the scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainStep {
    pub increment: bool,
    pub decrement: bool,
}

/// Map dimensions, per-cell terrain levels and the cell index.
#[derive(Debug, Clone)]
pub struct GameMap {
    pub name: String,
    width: i32,
    height: i32,
    dims: CellDims,
    /// World height of one terrain step.
    cliff_height: i32,
    obstacles: HashMap<CellIdx, Entity>,
    units: HashMap<CellIdx, Entity>,
    terrain_levels: HashMap<CellIdx, i32>,
}

impl GameMap {
    pub fn new(name: &str, width: i32, height: i32, dims: CellDims, cliff_height: i32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            dims,
            cliff_height,
            obstacles: HashMap::new(),
            units: HashMap::new(),
            terrain_levels: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dims(&self) -> CellDims {
        self.dims
    }

    pub fn cliff_height(&self) -> i32 {
        self.cliff_height
    }

    pub fn in_bounds(&self, cell: CellIdx) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub fn query(&self, cell: CellIdx) -> CellQuery {
        CellQuery {
            cell,
            in_bounds: self.in_bounds(cell),
        }
    }

    /// World rectangle covering the whole map.
    pub fn world_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            (self.width * self.dims.width) as f32,
            (self.height * self.dims.height) as f32,
        )
    }

    pub fn cell_rect(&self, cell: CellIdx) -> Rect {
        cell_rect(cell, self.dims)
    }

    pub fn lookup(&self, cell: CellIdx) -> Occupants {
        Occupants {
            unit: self.unit_at(cell),
            obstacle: self.obstacle_at(cell),
        }
    }

    pub fn unit_at(&self, cell: CellIdx) -> Option<Entity> {
        self.units.get(&cell).copied()
    }

    pub fn obstacle_at(&self, cell: CellIdx) -> Option<Entity> {
        self.obstacles.get(&cell).copied()
    }

    /// Index `unit` at `cell`. Returns the unit it displaced, if any.
    pub fn place_unit(&mut self, unit: Entity, cell: CellIdx) -> Option<Entity> {
        let displaced = self.units.insert(cell, unit).filter(|prev| *prev != unit);
        if let Some(prev) = displaced {
            tracing::warn!(?cell, ?prev, ?unit, "unit index entry overwritten");
        }
        displaced
    }

    /// Drop the index entry at `cell` if it points at `unit`.
    pub fn remove_unit(&mut self, unit: Entity, cell: CellIdx) -> bool {
        if self.units.get(&cell) == Some(&unit) {
            self.units.remove(&cell);
            true
        } else {
            false
        }
    }

    /// Index `obstacle` at `cell`. Returns the obstacle it replaced, if any.
    pub fn place_obstacle(&mut self, obstacle: Entity, cell: CellIdx) -> Option<Entity> {
        self.obstacles.insert(cell, obstacle).filter(|prev| *prev != obstacle)
    }

    pub fn remove_obstacle(&mut self, cell: CellIdx) -> Option<Entity> {
        self.obstacles.remove(&cell)
    }

    /// Exchange the unit entries of two cells. Either may be empty.
    pub fn swap_units(&mut self, a: CellIdx, b: CellIdx) {
        let at_a = self.units.remove(&a);
        let at_b = self.units.remove(&b);
        if let Some(unit) = at_b {
            self.units.insert(a, unit);
        }
        if let Some(unit) = at_a {
            self.units.insert(b, unit);
        }
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Terrain level of a cell; 0 when unknown or off the map.
    pub fn terrain_level(&self, cell: CellIdx) -> i32 {
        self.terrain_levels.get(&cell).copied().unwrap_or(0)
    }

    pub fn set_terrain_level(&mut self, cell: CellIdx, level: i32) {
        self.terrain_levels.insert(cell, level);
    }

    /// Assign terrain levels with a single running counter over the interior
    /// rows `1..height-1` and columns `1..width-1`. An increment applies
    /// before the cell takes the counter's value and a decrement after; the
    /// counter never drops below 0. Border cells stay at level 0.
    pub fn compute_terrain_levels<F>(&mut self, mut step_at: F)
    where
        F: FnMut(CellIdx) -> TerrainStep,
    {
        self.terrain_levels.clear();
        let mut level = 0i32;
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let cell = CellIdx::new(x, y);
                let step = step_at(cell);
                if step.increment {
                    level += 1;
                }
                self.terrain_levels.insert(cell, level);
                if step.decrement {
                    level = (level - 1).max(0);
                }
            }
        }
        tracing::debug!(
            map = %self.name,
            max_level = self.terrain_levels.values().max().copied().unwrap_or(0),
            "terrain levels computed"
        );
    }

    /// On-map cells whose center lies inside `rect`.
    pub fn cells_in_rect(&self, rect: &Rect) -> Vec<CellIdx> {
        cells_overlapping_rect(rect, self.dims)
            .into_iter()
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Every on-map cell, row-major.
    pub fn all_cells(&self) -> impl Iterator<Item = CellIdx> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| CellIdx::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn small_map() -> GameMap {
        GameMap::new("test", 6, 4, CellDims::new(32, 32), 10)
    }

    #[test]
    fn test_bounds() {
        let map = small_map();
        assert!(map.in_bounds(CellIdx::new(0, 0)));
        assert!(map.in_bounds(CellIdx::new(5, 3)));
        assert!(!map.in_bounds(CellIdx::new(6, 0)));
        assert!(!map.in_bounds(CellIdx::new(0, -1)));
        assert!(!map.query(CellIdx::new(-1, 2)).in_bounds);
    }

    #[test]
    fn test_place_and_lookup() {
        let mut world = World::new();
        let a = world.spawn(());
        let o = world.spawn(());
        let mut map = small_map();
        let cell = CellIdx::new(2, 2);

        assert_eq!(map.place_unit(a, cell), None);
        assert_eq!(map.place_obstacle(o, cell), None);
        assert_eq!(
            map.lookup(cell),
            Occupants {
                unit: Some(a),
                obstacle: Some(o)
            }
        );
        assert_eq!(map.lookup(CellIdx::new(0, 0)), Occupants::default());
    }

    #[test]
    fn test_place_unit_reports_displaced() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut map = small_map();
        let cell = CellIdx::new(1, 1);

        map.place_unit(a, cell);
        assert_eq!(map.place_unit(a, cell), None, "re-placing the same unit is not a displacement");
        assert_eq!(map.place_unit(b, cell), Some(a));
        assert_eq!(map.unit_at(cell), Some(b));
    }

    #[test]
    fn test_remove_unit_checks_identity() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut map = small_map();
        let cell = CellIdx::new(1, 1);

        map.place_unit(a, cell);
        assert!(!map.remove_unit(b, cell));
        assert!(map.remove_unit(a, cell));
        assert_eq!(map.unit_at(cell), None);
    }

    #[test]
    fn test_swap_units() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut map = small_map();
        let (ca, cb) = (CellIdx::new(1, 1), CellIdx::new(2, 1));

        map.place_unit(a, ca);
        map.place_unit(b, cb);
        map.swap_units(ca, cb);
        assert_eq!(map.unit_at(ca), Some(b));
        assert_eq!(map.unit_at(cb), Some(a));

        let empty = CellIdx::new(3, 1);
        map.swap_units(cb, empty);
        assert_eq!(map.unit_at(cb), None);
        assert_eq!(map.unit_at(empty), Some(a));
        assert_eq!(map.unit_count(), 2);
    }

    #[test]
    fn test_terrain_scan_carries_level() {
        let mut map = small_map();
        let up = CellIdx::new(2, 1);
        let down = CellIdx::new(4, 1);
        map.compute_terrain_levels(|cell| TerrainStep {
            increment: cell == up,
            decrement: cell == down,
        });

        assert_eq!(map.terrain_level(CellIdx::new(1, 1)), 0);
        assert_eq!(map.terrain_level(up), 1);
        assert_eq!(map.terrain_level(CellIdx::new(3, 1)), 1);
        // The decrement takes effect after its own cell.
        assert_eq!(map.terrain_level(down), 1);
        assert_eq!(map.terrain_level(CellIdx::new(1, 2)), 0);
        // Border cells are never scanned.
        assert_eq!(map.terrain_level(CellIdx::new(2, 0)), 0);
        assert_eq!(map.terrain_level(CellIdx::new(0, 2)), 0);
    }

    #[test]
    fn test_terrain_level_carries_across_rows() {
        let mut map = small_map();
        let up = CellIdx::new(4, 1);
        map.compute_terrain_levels(|cell| TerrainStep {
            increment: cell == up,
            decrement: false,
        });
        assert_eq!(map.terrain_level(CellIdx::new(1, 2)), 1);
        assert_eq!(map.terrain_level(CellIdx::new(4, 2)), 1);
        assert_eq!(map.terrain_level(CellIdx::new(5, 2)), 0);
    }

    #[test]
    fn test_terrain_level_saturates_at_zero() {
        let mut map = small_map();
        map.compute_terrain_levels(|cell| TerrainStep {
            increment: cell == CellIdx::new(3, 1),
            decrement: cell.x == 1 || cell == CellIdx::new(4, 1),
        });
        assert_eq!(map.terrain_level(CellIdx::new(1, 1)), 0);
        assert_eq!(map.terrain_level(CellIdx::new(2, 1)), 0);
        assert_eq!(map.terrain_level(CellIdx::new(3, 1)), 1);
        assert_eq!(map.terrain_level(CellIdx::new(4, 1)), 1);
        assert_eq!(map.terrain_level(CellIdx::new(1, 2)), 0);
    }

    #[test]
    fn test_cells_in_rect_clipped() {
        let map = small_map();
        let cells = map.cells_in_rect(&Rect::new(-64.0, -64.0, 128.0, 128.0));
        assert_eq!(cells, vec![CellIdx::new(0, 0), CellIdx::new(1, 0), CellIdx::new(0, 1), CellIdx::new(1, 1)]);
        assert_eq!(map.all_cells().count(), 24);
    }
}
