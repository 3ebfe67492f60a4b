//! Cleanup system: reaps destroyed units and obstacles, ages combat texts.

use openstrat_core::components::{Obstacle, Unit};
use openstrat_core::constants::{DT, GROUND_OBSTACLE};
use openstrat_core::events::GameEvent;

use crate::context::{entity_id, GameContext};
use crate::systems::vision;
use crate::world_setup;

/// Destruction sweep. Runs after all movement and combat for the tick.
///
/// Units at or below zero health are despawned (and deselected); if any
/// were, vision is recomputed once. Destructible obstacles at or below zero
/// health are replaced in place by a fresh ground obstacle.
pub fn run(ctx: &mut GameContext) {
    ctx.despawn_buffer.clear();

    let mut dead_units = Vec::new();
    for (entity, unit) in ctx.world.query_mut::<&Unit>() {
        if unit.current_health <= 0 {
            dead_units.push((entity, unit.cell));
        }
    }

    for &(entity, cell) in &dead_units {
        if ctx.selected_unit == Some(entity) {
            ctx.selected_unit = None;
            ctx.emit(GameEvent::UnitDeselected);
        }
        ctx.map.remove_unit(entity, cell);
        ctx.despawn_buffer.push(entity);
        tracing::debug!(?entity, ?cell, "unit destroyed");
        // Before the despawn, while visibility can still be read.
        ctx.emit_about(
            entity,
            GameEvent::UnitDestroyed {
                unit: entity_id(entity),
                cell,
            },
        );
    }
    for entity in ctx.despawn_buffer.drain(..) {
        if let Err(err) = ctx.world.despawn(entity) {
            tracing::warn!(?entity, %err, "destroyed unit already gone");
        }
    }
    if !dead_units.is_empty() {
        vision::compute_team_vision(ctx);
    }

    let mut wrecked = Vec::new();
    for (entity, obstacle) in ctx.world.query_mut::<&Obstacle>() {
        if obstacle.is_destructible && obstacle.current_health <= 0 {
            wrecked.push((entity, obstacle.cell));
        }
    }
    for (entity, cell) in wrecked {
        ctx.map.remove_obstacle(cell);
        if let Err(err) = ctx.world.despawn(entity) {
            tracing::warn!(?entity, %err, "destroyed obstacle already gone");
        }
        // The ground template is checked when templates are loaded.
        if let Err(err) =
            world_setup::spawn_obstacle(&mut ctx.world, &mut ctx.map, &ctx.templates, GROUND_OBSTACLE, cell)
        {
            tracing::error!(%err, ?cell, "could not replace destroyed obstacle");
        }
        tracing::debug!(?cell, "obstacle destroyed");
        ctx.emit(GameEvent::ObstacleDestroyed { cell });
    }
}

/// Advance every combat text by one tick and drop the expired ones.
pub fn age_combat_texts(ctx: &mut GameContext) {
    for text in &mut ctx.combat_texts {
        text.age_secs += DT;
    }
    ctx.combat_texts.retain(|text| !text.is_expired());
}
