//! Snapshot system: queries the ECS world and builds a complete FrameSnapshot.
//!
//! Read-only. Only what the local team may know is published: hidden
//! enemies are left out, and vision cones are listed for friendly units only.
//! Events arrive already filtered: systems emit events about a unit only
//! while the local team knows it.

use hecs::{Entity, World};

use openstrat_core::components::{Ability, IsVisible, MovePoints, Obstacle, Unit};
use openstrat_core::enums::Team;
use openstrat_core::events::GameEvent;
use openstrat_core::state::*;
use openstrat_core::types::{CellIdx, IsoscelesTrapezoid, Rect};
use openstrat_grid::Elevation;

use crate::context::{entity_id, GameContext};
use crate::systems::abilities::{cooldown_remaining, effective_uses};

/// Build the frame snapshot. `viewport` defaults to the whole map.
pub fn build_snapshot(
    ctx: &GameContext,
    viewport: Option<Rect>,
    hovered: Option<CellIdx>,
    targeting: Option<TargetingPreview>,
    events: Vec<GameEvent>,
) -> FrameSnapshot {
    let rect = viewport.unwrap_or_else(|| ctx.map.world_rect());
    let cells_in_view = ctx.map.cells_in_rect(&rect);

    FrameSnapshot {
        time: ctx.time,
        turn: ctx.turn,
        local_team: ctx.local_team,
        player: PlayerView {
            name: ctx.player.name.clone(),
            team: ctx.player.team,
            supplies: ctx.player.supplies,
        },
        selected_unit: ctx.selected_unit.map(entity_id),
        units: build_units(ctx),
        obstacles_in_view: build_obstacles(ctx, &cells_in_view),
        cells_in_view,
        vision_cones: build_vision_cones(&ctx.world, ctx.local_team),
        combat_texts: ctx.combat_texts.clone(),
        events,
        hovered_cell: hovered
            .filter(|c| ctx.map.in_bounds(*c))
            .map(|c| build_cell_info(ctx, c)),
        targeting,
    }
}

/// Friendly, or an enemy tagged visible.
fn is_known(world: &World, entity: Entity, unit: &Unit, local: Team) -> bool {
    unit.team == local || world.get::<&IsVisible>(entity).is_ok()
}

fn build_units(ctx: &GameContext) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = ctx
        .world
        .query::<&Unit>()
        .iter()
        .filter(|(entity, unit)| is_known(&ctx.world, *entity, unit, ctx.local_team))
        .map(|(entity, unit)| UnitView {
            id: entity_id(entity),
            kind: unit.kind.clone(),
            team: unit.team,
            cell: unit.cell,
            current_health: unit.current_health,
            max_health: unit.max_health,
            supplies: unit.supplies,
            max_supplies: unit.max_supplies,
            stance: unit.stance,
            atlas_id: unit.atlas_id,
            atlas_coords: unit.atlas_coords,
            selected_ability: unit.selected_ability,
            abilities: unit
                .abilities
                .iter()
                .map(|a| build_ability(a, ctx.turn))
                .collect(),
            moving: ctx.world.get::<&MovePoints>(entity).is_ok(),
        })
        .collect();
    units.sort_by_key(|u| u.id);
    units
}

fn build_ability(ability: &Ability, turn: i32) -> AbilityView {
    AbilityView {
        name: ability.name.clone(),
        description: ability.description.clone(),
        supply_cost: ability.supply_cost,
        range: ability.range,
        cooldown_remaining: cooldown_remaining(ability, turn),
        uses_remaining: (ability.max_uses_per_turn >= 0)
            .then(|| (ability.max_uses_per_turn - effective_uses(ability, turn)).max(0)),
    }
}

fn build_obstacles(ctx: &GameContext, cells: &[CellIdx]) -> Vec<ObstacleView> {
    cells
        .iter()
        .filter_map(|cell| ctx.map.obstacle_at(*cell))
        .filter_map(|entity| {
            let o = ctx.world.get::<&Obstacle>(entity).ok()?;
            Some(ObstacleView {
                cell: o.cell,
                kind: o.kind.clone(),
                display_name: o.display_name.clone(),
                atlas_id: o.atlas_id,
                atlas_coords: o.atlas_coords,
                current_health: o.current_health,
                max_health: o.max_health,
            })
        })
        .collect()
}

fn build_vision_cones(world: &World, local: Team) -> Vec<VisionConeView> {
    let mut cones: Vec<VisionConeView> = world
        .query::<(&Unit, &IsoscelesTrapezoid)>()
        .iter()
        .filter(|(_, (unit, _))| unit.team == local)
        .map(|(entity, (_, trapezoid))| VisionConeView {
            unit: entity_id(entity),
            corners: trapezoid.corners(),
        })
        .collect();
    cones.sort_by_key(|c| c.unit);
    cones
}

/// Height breakdown of the hovered cell. A hidden enemy on the cell is
/// reported as absent.
fn build_cell_info(ctx: &GameContext, cell: CellIdx) -> CellInfoView {
    let elevation = Elevation::new(&ctx.world, &ctx.map);
    let summary = elevation.summary(ctx.map.query(cell));

    let known_unit = summary.unit.filter(|entity| ctx.knows(*entity));
    let obstacle_name = summary.obstacle.and_then(|entity| {
        ctx.world
            .get::<&Obstacle>(entity)
            .ok()
            .map(|o| o.display_name.clone())
    });

    let (unit_height, total_height) = if known_unit.is_some() {
        (summary.unit_height, summary.total_height)
    } else {
        (0, summary.obstacle_stack_height)
    };

    CellInfoView {
        cell,
        obstacle_name,
        unit: known_unit.map(entity_id),
        terrain_level: summary.terrain_level,
        terrain_height: summary.terrain_height,
        obstacle_height: summary.obstacle_intrinsic_height,
        unit_height,
        total_height,
    }
}
