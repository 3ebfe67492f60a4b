//! Per-cell height composition.
//!
//! Heights are derived from the cell's terrain level, its obstacle and its
//! unit. Out-of-bounds cells and empty slots contribute 0.

use hecs::{Entity, World};

use openstrat_core::components::{Obstacle, Unit};
use openstrat_core::types::CellIdx;

use crate::map::{CellQuery, GameMap};

/// Height and occupancy breakdown for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSummary {
    pub cell: CellIdx,
    pub unit: Option<Entity>,
    pub obstacle: Option<Entity>,
    pub unit_stops_projectile: bool,
    pub obstacle_stops_projectile: bool,
    pub terrain_level: i32,
    pub terrain_height: i32,
    pub unit_height: i32,
    pub obstacle_intrinsic_height: i32,
    /// Terrain plus obstacle, excluding any unit.
    pub obstacle_stack_height: i32,
    pub total_height: i32,
}

/// Read-only height queries over a world and its map.
pub struct Elevation<'a> {
    world: &'a World,
    map: &'a GameMap,
}

impl<'a> Elevation<'a> {
    pub fn new(world: &'a World, map: &'a GameMap) -> Self {
        Self { world, map }
    }

    fn obstacle(&self, q: CellQuery) -> Option<hecs::Ref<'a, Obstacle>> {
        if !q.in_bounds {
            return None;
        }
        let entity = self.map.obstacle_at(q.cell)?;
        self.world.get::<&Obstacle>(entity).ok()
    }

    fn unit(&self, q: CellQuery) -> Option<hecs::Ref<'a, Unit>> {
        if !q.in_bounds {
            return None;
        }
        let entity = self.map.unit_at(q.cell)?;
        self.world.get::<&Unit>(entity).ok()
    }

    pub fn terrain_level(&self, q: CellQuery) -> i32 {
        if q.in_bounds {
            self.map.terrain_level(q.cell)
        } else {
            0
        }
    }

    /// `terrain_level * cliff_height`.
    pub fn terrain_height(&self, q: CellQuery) -> i32 {
        self.terrain_level(q) * self.map.cliff_height()
    }

    /// Height of the unit in its current stance, 0 when empty.
    pub fn unit_height(&self, q: CellQuery) -> i32 {
        self.unit(q).map(|u| u.stance_height()).unwrap_or(0)
    }

    pub fn obstacle_intrinsic_height(&self, q: CellQuery) -> i32 {
        self.obstacle(q).map(|o| o.intrinsic_height).unwrap_or(0)
    }

    /// Height of the terrain and obstacle together, excluding the unit.
    ///
    /// Cliffs and walls are the terrain step itself and stand
    /// `level * cliff_height` tall. Other obstacles sit on `level - 1`
    /// steps (never fewer than 0) plus their own height.
    pub fn obstacle_stack_height(&self, q: CellQuery) -> i32 {
        if !q.in_bounds {
            return 0;
        }
        let level = self.terrain_level(q);
        let step = self.map.cliff_height();
        match self.obstacle(q) {
            Some(o) if o.class.is_terrain_step() => level * step,
            Some(o) => (level - 1).max(0) * step + o.intrinsic_height,
            None => level * step,
        }
    }

    /// Highest point of the cell.
    ///
    /// A unit on an obstacle it stands on top of adds its height to the
    /// obstacle stack. Otherwise the unit stands on the terrain beside the
    /// obstacle and the cell is as tall as whichever reaches higher.
    pub fn total_height(&self, q: CellQuery) -> i32 {
        if !q.in_bounds {
            return 0;
        }
        let stack = self.obstacle_stack_height(q);
        let Some(unit_height) = self.unit(q).map(|u| u.stance_height()) else {
            return stack;
        };
        let on_top = self.obstacle(q).map(|o| o.unit_stands_on_top).unwrap_or(false);
        if on_top {
            stack + unit_height
        } else {
            stack.max(self.terrain_height(q) + unit_height)
        }
    }

    pub fn summary(&self, q: CellQuery) -> CellSummary {
        let occupants = if q.in_bounds {
            self.map.lookup(q.cell)
        } else {
            Default::default()
        };
        CellSummary {
            cell: q.cell,
            unit: occupants.unit,
            obstacle: occupants.obstacle,
            unit_stops_projectile: self.unit(q).map(|u| u.stops_projectile).unwrap_or(false),
            obstacle_stops_projectile: self
                .obstacle(q)
                .map(|o| o.stops_projectile)
                .unwrap_or(false),
            terrain_level: self.terrain_level(q),
            terrain_height: self.terrain_height(q),
            unit_height: self.unit_height(q),
            obstacle_intrinsic_height: self.obstacle_intrinsic_height(q),
            obstacle_stack_height: self.obstacle_stack_height(q),
            total_height: self.total_height(q),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use openstrat_core::enums::{Stance, Team};
    use openstrat_core::types::CellDims;
    use proptest::prelude::*;

    const H: i32 = 10;

    fn map() -> GameMap {
        GameMap::new("test", 8, 8, CellDims::new(32, 32), H)
    }

    #[test]
    fn test_empty_cell_uses_terrain() {
        let world = World::new();
        let mut map = map();
        let cell = CellIdx::new(3, 3);
        map.set_terrain_level(cell, 2);
        let elev = Elevation::new(&world, &map);
        assert_eq!(elev.total_height(map.query(cell)), 2 * H);
    }

    #[test]
    fn test_out_of_bounds_is_zero() {
        let world = World::new();
        let map = map();
        let elev = Elevation::new(&world, &map);
        let q = map.query(CellIdx::new(-1, 4));
        assert_eq!(elev.total_height(q), 0);
        assert_eq!(elev.summary(q).unit, None);
    }

    #[test]
    fn test_standard_obstacle_sits_one_step_down() {
        let mut world = World::new();
        let mut map = map();
        let cell = CellIdx::new(2, 2);
        map.set_terrain_level(cell, 2);
        place_obstacle(&mut world, &mut map, obstacle("crate", cell, 4, true));
        let elev = Elevation::new(&world, &map);
        assert_eq!(elev.obstacle_stack_height(map.query(cell)), H + 4);
    }

    #[test]
    fn test_unit_on_top_of_obstacle() {
        let mut world = World::new();
        let mut map = map();
        let cell = CellIdx::new(2, 2);
        place_obstacle(&mut world, &mut map, obstacle("crate", cell, 4, true));
        place_unit(&mut world, &mut map, unit(Team::Blue, cell, 6));
        let elev = Elevation::new(&world, &map);
        assert_eq!(elev.total_height(map.query(cell)), 10);
    }

    #[test]
    fn test_unit_beside_taller_obstacle() {
        let mut world = World::new();
        let mut map = map();
        let cell = CellIdx::new(2, 2);
        place_obstacle(&mut world, &mut map, obstacle("tree", cell, 12, false));
        place_unit(&mut world, &mut map, unit(Team::Blue, cell, 6));
        let elev = Elevation::new(&world, &map);
        assert_eq!(elev.total_height(map.query(cell)), 12);
    }

    #[test]
    fn test_stance_changes_unit_height() {
        let mut world = World::new();
        let mut map = map();
        let cell = CellIdx::new(2, 2);
        let e = place_unit(&mut world, &mut map, unit(Team::Blue, cell, 6));
        world.get::<&mut Unit>(e).unwrap().stance = Stance::Prone;
        let elev = Elevation::new(&world, &map);
        assert_eq!(elev.unit_height(map.query(cell)), 1);
    }

    #[test]
    fn test_summary_fields() {
        let mut world = World::new();
        let mut map = map();
        let cell = CellIdx::new(4, 4);
        map.set_terrain_level(cell, 1);
        let o = place_obstacle(&mut world, &mut map, obstacle("ground", cell, 0, true));
        let u = place_unit(&mut world, &mut map, unit(Team::Red, cell, 6));
        let elev = Elevation::new(&world, &map);
        let s = elev.summary(map.query(cell));
        assert_eq!(s.unit, Some(u));
        assert_eq!(s.obstacle, Some(o));
        assert!(s.unit_stops_projectile);
        assert!(!s.obstacle_stops_projectile);
        assert_eq!(s.terrain_height, H);
        assert_eq!(s.obstacle_stack_height, 0);
        assert_eq!(s.total_height, 6);
    }

    proptest! {
        #[test]
        fn prop_cliff_height_ignores_intrinsic(level in 0i32..6, intrinsic in 0i32..50, step in 1i32..20) {
            let mut world = World::new();
            let mut map = GameMap::new("p", 4, 4, CellDims::new(32, 32), step);
            let cell = CellIdx::new(1, 1);
            map.set_terrain_level(cell, level);
            place_obstacle(&mut world, &mut map, obstacle("cliff", cell, intrinsic, false));
            let elev = Elevation::new(&world, &map);
            prop_assert_eq!(elev.total_height(map.query(cell)), level * step);
        }
    }
}
