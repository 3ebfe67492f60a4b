//! Movement system: advances committed paths one cell per tick.
//!
//! A unit stepping into a cell held by another unit swaps places with it.
//! The cell index is updated after every single step.

use hecs::{Entity, World};

use openstrat_core::components::{MovePoints, Unit};
use openstrat_core::events::GameEvent;
use openstrat_core::types::{CellIdx, IsoscelesTrapezoid};
use openstrat_grid::GameMap;

use crate::context::{entity_id, GameContext};
use crate::systems::vision;

/// Step every unit that has a pending path.
pub fn run(ctx: &mut GameContext) {
    let movers: Vec<Entity> = ctx
        .world
        .query::<&MovePoints>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in movers {
        step(ctx, entity);
    }
}

/// Pop one cell off the unit's path and move there. Removes the path once
/// it is exhausted.
///
/// Movement events are published only for units the local team knows about
/// before or after the step.
pub fn step(ctx: &mut GameContext, entity: Entity) {
    let next = match ctx.world.get::<&mut MovePoints>(entity) {
        Ok(mut points) => points.cells.pop_front(),
        Err(_) => return,
    };
    let Some(next) = next else {
        clear_path(ctx, entity);
        return;
    };
    let Some(from) = ctx.world.get::<&Unit>(entity).ok().map(|u| u.cell) else {
        return;
    };
    let known_before = ctx.knows(entity);

    let swapped = match ctx.map.unit_at(next).filter(|other| *other != entity) {
        Some(other) => {
            ctx.map.swap_units(from, next);
            relocate(&ctx.world, &ctx.map, entity, next);
            relocate(&ctx.world, &ctx.map, other, from);
            tracing::debug!(?entity, ?other, ?from, to = ?next, "units swapped");
            Some(other)
        }
        None => {
            ctx.map.remove_unit(entity, from);
            ctx.map.place_unit(entity, next);
            relocate(&ctx.world, &ctx.map, entity, next);
            tracing::debug!(?entity, ?from, to = ?next, "unit stepped");
            None
        }
    };

    let exhausted = ctx
        .world
        .get::<&MovePoints>(entity)
        .map(|points| points.cells.is_empty())
        .unwrap_or(false);
    if exhausted {
        clear_path(ctx, entity);
    }

    vision::compute_team_vision(ctx);

    if !(known_before || ctx.knows(entity)) {
        return;
    }
    if let Some(other) = swapped {
        if ctx.knows(other) {
            ctx.emit(GameEvent::UnitsSwapped {
                unit: entity_id(entity),
                other: entity_id(other),
            });
        }
    }
    ctx.emit(GameEvent::UnitMoved {
        unit: entity_id(entity),
        from,
        to: next,
    });
}

fn clear_path(ctx: &mut GameContext, entity: Entity) {
    if let Err(err) = ctx.world.remove_one::<MovePoints>(entity) {
        tracing::warn!(?entity, %err, "could not clear movement path");
    }
}

/// Write a unit's new cell and rebuild its trapezoid there.
fn relocate(world: &World, map: &GameMap, entity: Entity, cell: CellIdx) {
    if let Ok(mut unit) = world.get::<&mut Unit>(entity) {
        unit.cell = cell;
    }
    if let Ok(mut trapezoid) = world.get::<&mut IsoscelesTrapezoid>(entity) {
        vision::position_trapezoid(&mut trapezoid, cell, map);
    }
}
