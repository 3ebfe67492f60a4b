//! Entity spawn factories for setting up the simulation world.
//!
//! Builds the map (obstacles plus terrain levels) from a layout, and units
//! from their templates.

use std::collections::HashMap;

use hecs::{Entity, World};

use openstrat_core::components::{Obstacle, Unit};
use openstrat_core::constants::DEFAULT_FACING_DEG;
use openstrat_core::enums::{ObstacleClass, Stance, Team};
use openstrat_core::error::{ConfigError, SpawnError};
use openstrat_core::templates::{MapLayout, Templates};
use openstrat_core::types::CellIdx;
use openstrat_grid::geometry::{build_trapezoid, cell_center};
use openstrat_grid::{GameMap, TerrainStep};

/// Build the map described by `layout`: one obstacle per painted cell,
/// looked up by sprite coordinates, then the terrain level scan.
///
/// Fails without touching `world` if any cell lies off the map or has no
/// matching obstacle template.
pub fn build_map(
    world: &mut World,
    templates: &Templates,
    layout: &MapLayout,
) -> Result<GameMap, ConfigError> {
    if layout.width <= 0 || layout.height <= 0 {
        return Err(ConfigError::InvalidMapSize {
            width: layout.width,
            height: layout.height,
        });
    }

    let mut map = GameMap::new(
        &layout.name,
        layout.width,
        layout.height,
        templates.cell_dims(),
        templates.cliff_height(),
    );

    // Resolve every template before spawning anything.
    let mut resolved = Vec::with_capacity(layout.cells.len());
    let mut steps = HashMap::with_capacity(layout.cells.len());
    for painted in &layout.cells {
        if !map.in_bounds(painted.cell) {
            return Err(ConfigError::CellOutsideMap(painted.cell));
        }
        let (kind, template) =
            templates.obstacle_by_atlas(painted.atlas_id, painted.atlas_coords)?;
        resolved.push((kind, painted.cell));
        steps.insert(
            painted.cell,
            TerrainStep {
                increment: template.increment_terrain_height,
                decrement: template.decrement_terrain_height,
            },
        );
    }

    for (kind, cell) in resolved {
        spawn_obstacle(world, &mut map, templates, kind, cell)?;
    }

    map.compute_terrain_levels(|cell| steps.get(&cell).copied().unwrap_or_default());

    tracing::info!(
        map = %map.name,
        width = map.width(),
        height = map.height(),
        obstacles = map.obstacle_count(),
        "map built"
    );
    Ok(map)
}

/// Spawn an obstacle from its template and index it at `cell`, replacing
/// (and despawning) whatever obstacle was there.
pub fn spawn_obstacle(
    world: &mut World,
    map: &mut GameMap,
    templates: &Templates,
    kind: &str,
    cell: CellIdx,
) -> Result<Entity, ConfigError> {
    let template = templates.obstacle(kind)?;
    let obstacle = Obstacle {
        kind: kind.to_string(),
        display_name: template.display_name.clone(),
        class: ObstacleClass::from_display_name(&template.display_name),
        move_cost: template.move_cost,
        intrinsic_height: template.intrinsic_height,
        cell,
        is_destructible: template.is_destructible,
        max_health: template.max_health,
        current_health: template.max_health,
        stops_projectile: template.stops_projectile,
        atlas_id: template.atlas_id,
        atlas_coords: template.atlas_coords,
        unit_stands_on_top: template.unit_stands_on_top,
    };

    let entity = world.spawn((obstacle,));
    if let Some(previous) = map.place_obstacle(entity, cell) {
        if let Err(err) = world.despawn(previous) {
            tracing::warn!(?previous, %err, "replaced obstacle already gone");
        }
    }
    Ok(entity)
}

/// Spawn a unit from its template.
///
/// Supplies start at half the maximum (rounded down) and health at the
/// maximum. A vision trapezoid facing north is attached when the template
/// enables vision. Occupied and off-map cells are refused.
pub fn spawn_unit(
    world: &mut World,
    map: &mut GameMap,
    templates: &Templates,
    kind: &str,
    team: Team,
    cell: CellIdx,
) -> Result<Entity, SpawnError> {
    if !map.in_bounds(cell) {
        return Err(SpawnError::OutOfBounds(cell));
    }
    if map.unit_at(cell).is_some() {
        return Err(SpawnError::CellOccupied(cell));
    }
    let template = templates
        .unit(kind)
        .map_err(|_| SpawnError::UnknownTemplate(kind.to_string()))?;

    let unit = Unit {
        kind: kind.to_string(),
        description: template.description.clone(),
        team,
        cell,
        intrinsic_height: template.intrinsic_height,
        crouch_height: template.crouch_height,
        prone_height: template.prone_height,
        max_supplies: template.max_supplies,
        supplies: template.max_supplies / 2,
        max_health: template.max_health,
        current_health: template.max_health,
        max_occupancy: template.max_occupancy,
        stops_projectile: template.stops_projectile,
        stance: Stance::Standing,
        is_person: template.is_person,
        is_vehicle: template.is_vehicle,
        is_structure: template.is_structure,
        atlas_id: template.atlas_id,
        atlas_coords: template.atlas_coords,
        abilities: template
            .abilities
            .iter()
            .map(|(name, ability)| ability.instantiate(name))
            .collect(),
        selected_ability: None,
    };

    let entity = if template.use_vision {
        let dims = map.dims();
        let trapezoid = build_trapezoid(
            cell_center(cell, dims),
            template.vision_base_width,
            template.vision_top_width,
            template.vision_length,
            DEFAULT_FACING_DEG,
            dims.width as f32,
        );
        world.spawn((unit, trapezoid))
    } else {
        world.spawn((unit,))
    };
    map.place_unit(entity, cell);

    tracing::info!(kind, ?team, ?cell, "unit spawned");
    Ok(entity)
}
