//! Vision system: trapezoid placement and local-team fog of war.

use hecs::{Entity, World};

use openstrat_core::components::{IsVisible, Unit};
use openstrat_core::enums::Team;
use openstrat_core::types::{CellIdx, IsoscelesTrapezoid};
use openstrat_grid::collision::trapezoid_rect_collision;
use openstrat_grid::geometry::{build_trapezoid, cell_center};
use openstrat_grid::{first_blocking_cell, GameMap};

use crate::context::GameContext;

/// Rebuild one trapezoid around the center of `cell`, keeping its shape and
/// facing.
pub fn position_trapezoid(trapezoid: &mut IsoscelesTrapezoid, cell: CellIdx, map: &GameMap) {
    let dims = map.dims();
    *trapezoid = build_trapezoid(
        cell_center(cell, dims),
        trapezoid.base_width,
        trapezoid.top_width,
        trapezoid.length,
        trapezoid.facing_angle,
        dims.width as f32,
    );
}

/// Rebuild every unit's trapezoid from its current cell and facing.
pub fn position_all_trapezoids(world: &mut World, map: &GameMap) {
    for (_entity, (unit, trapezoid)) in world.query_mut::<(&Unit, &mut IsoscelesTrapezoid)>() {
        position_trapezoid(trapezoid, unit.cell, map);
    }
}

/// Recompute which enemies the local team can see.
///
/// Always a full pass: every tag is cleared first, then each enemy is
/// tagged if some friendly trapezoid overlaps its cell and the sightline
/// between the two is not blocked by anything but the enemy itself.
pub fn compute_team_vision(ctx: &mut GameContext) {
    let local = ctx.local_team;
    let visible = visible_enemies(&ctx.world, &ctx.map, local);

    let tagged: Vec<Entity> = ctx
        .world
        .query::<&IsVisible>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for entity in tagged {
        if let Err(err) = ctx.world.remove_one::<IsVisible>(entity) {
            tracing::warn!(?entity, %err, "could not clear visibility tag");
        }
    }
    for &entity in &visible {
        if let Err(err) = ctx.world.insert_one(entity, IsVisible) {
            tracing::warn!(?entity, %err, "could not tag visible enemy");
        }
    }

    tracing::debug!(team = ?local, visible = visible.len(), "vision recomputed");
}

/// Enemies of `team` currently seen by at least one of its units.
pub fn visible_enemies(world: &World, map: &GameMap, team: Team) -> Vec<Entity> {
    let mut observers = Vec::new();
    let mut enemies = Vec::new();
    for (entity, unit) in world.query::<&Unit>().iter() {
        if unit.team == team {
            if let Ok(trapezoid) = world.get::<&IsoscelesTrapezoid>(entity) {
                observers.push((unit.cell, *trapezoid));
            }
        } else {
            enemies.push((entity, unit.cell));
        }
    }

    let mut visible = Vec::new();
    for (enemy, enemy_cell) in enemies {
        let enemy_rect = map.cell_rect(enemy_cell);
        let seen = observers.iter().any(|(observer_cell, trapezoid)| {
            trapezoid_rect_collision(trapezoid, &enemy_rect)
                && sightline_clear(world, map, *observer_cell, enemy_cell)
        });
        if seen {
            visible.push(enemy);
        }
    }
    visible
}

/// The first blocking cell on the sightline, if any, must be the target's own.
fn sightline_clear(world: &World, map: &GameMap, observer: CellIdx, target: CellIdx) -> bool {
    match first_blocking_cell(world, map, observer, target) {
        None => true,
        Some(cell) => cell == target,
    }
}
