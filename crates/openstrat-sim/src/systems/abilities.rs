//! Ability resolution: validation, commit, targeting and effects.
//!
//! A commit runs in a fixed order. The rule checks happen first and a failed
//! check returns a `RejectReason` with the world untouched. Then use counts,
//! cooldown and supply cost are written together. A move whose path gates
//! fail stays committed but attaches no path and pays no path cost. Last,
//! the accuracy roll and the sightline pick the effective target and the
//! ability's effect is applied.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use openstrat_core::commands::{IntentKind, NetIntent};
use openstrat_core::components::{Ability, DamageRange, MovePoints, Obstacle, Unit};
use openstrat_core::constants::COMBAT_TEXT_DURATION_SECS;
use openstrat_core::enums::{
    AbilityKind, ArmorClass, ObstacleClass, RejectReason, TargetingMode, Team, Trajectory,
};
use openstrat_core::events::{CombatText, GameEvent};
use openstrat_core::state::TargetingPreview;
use openstrat_core::types::{CellIdx, IsoscelesTrapezoid};
use openstrat_grid::geometry::{
    angle_between_points, bresenham_cells, cell_center, cell_neighbor_rect, chebyshev_distance,
};
use openstrat_grid::{first_blocking_cell, sightline_cells, GameMap};

use crate::context::{entity_from_id, entity_id, GameContext};
use crate::systems::vision;

/// Outcome of a committed ability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub target: CellIdx,
    /// Where the effect landed after scatter and sightline blocking.
    pub effective_target: CellIdx,
    pub path: Vec<CellIdx>,
    pub path_cost: i32,
    pub blocking_cell: Option<CellIdx>,
    pub missed: bool,
    /// Set when a committed move attached no path.
    pub move_blocked: Option<RejectReason>,
}

/// Uses recorded for the current turn. Counts from earlier turns are stale.
pub fn effective_uses(ability: &Ability, turn: i32) -> i32 {
    if ability.last_turn_used == Some(turn) {
        ability.uses_this_turn
    } else {
        0
    }
}

/// Turns left before the ability is off cooldown.
pub fn cooldown_remaining(ability: &Ability, turn: i32) -> i32 {
    match ability.last_turn_used {
        Some(last) if ability.max_cooldown >= 0 => (ability.max_cooldown - (turn - last)).max(0),
        _ => 0,
    }
}

/// Rule checks shared by every ability, in order: bounds, supplies, uses
/// per turn, cooldown, range. Negative limits mean unlimited.
pub fn validate(
    ability: &Ability,
    unit_cell: CellIdx,
    supplies: i32,
    target: CellIdx,
    turn: i32,
    map: &GameMap,
) -> Result<(), RejectReason> {
    if ability.targeting == TargetingMode::Cell && !map.in_bounds(target) {
        return Err(RejectReason::TargetOutOfBounds);
    }
    if ability.supply_cost > supplies {
        return Err(RejectReason::InsufficientSupplies);
    }
    if ability.max_uses_per_turn >= 0 && effective_uses(ability, turn) >= ability.max_uses_per_turn
    {
        return Err(RejectReason::MaxUsesReached);
    }
    if ability.max_cooldown >= 0
        && ability
            .last_turn_used
            .is_some_and(|last| turn - last < ability.max_cooldown)
    {
        return Err(RejectReason::OnCooldown);
    }
    if ability.range >= 0 && chebyshev_distance(unit_cell, target) > ability.range {
        return Err(RejectReason::OutOfRange);
    }
    Ok(())
}

/// Walk the integer line from `from` (exclusive) toward `target`, adding
/// each cell's obstacle move cost. The path stops before the first cell that
/// is out of `range` or would push the cost past `budget`. Returns the path
/// and the cost of the cells on it.
pub fn plan_path(
    world: &World,
    map: &GameMap,
    from: CellIdx,
    target: CellIdx,
    range: i32,
    budget: i32,
) -> (Vec<CellIdx>, i32) {
    let mut path = Vec::new();
    let mut cost = 0;
    for cell in bresenham_cells(from, target).into_iter().skip(1) {
        let step = map
            .obstacle_at(cell)
            .and_then(|o| world.get::<&Obstacle>(o).ok().map(|o| o.move_cost))
            .unwrap_or(0);
        if (range >= 0 && chebyshev_distance(from, cell) > range) || cost + step > budget {
            break;
        }
        cost += step;
        path.push(cell);
    }
    (path, cost)
}

/// Movement checks: no path in flight, a non-empty path affordable after
/// the ability's own cost, and a final cell that is not a cliff.
fn check_move(
    world: &World,
    map: &GameMap,
    entity: Entity,
    ability: &Ability,
    unit_cell: CellIdx,
    supplies: i32,
    target: CellIdx,
) -> Result<(Vec<CellIdx>, i32), RejectReason> {
    if world.get::<&MovePoints>(entity).is_ok() {
        return Err(RejectReason::MoveInProgress);
    }
    let (path, cost) = plan_path(
        world,
        map,
        unit_cell,
        target,
        ability.range,
        supplies - ability.supply_cost,
    );
    let Some(&last) = path.last() else {
        return Err(RejectReason::NoPath);
    };
    let ends_on_cliff = map
        .obstacle_at(last)
        .and_then(|o| world.get::<&Obstacle>(o).ok().map(|o| o.class == ObstacleClass::Cliff))
        .unwrap_or(false);
    if ends_on_cliff {
        return Err(RejectReason::PathEndsOnCliff);
    }
    Ok((path, cost))
}

/// Use ability `index` of `entity` against `target`.
pub fn use_ability(
    ctx: &mut GameContext,
    entity: Entity,
    index: usize,
    target: CellIdx,
) -> Result<Resolution, RejectReason> {
    let (ability, unit_cell, supplies, team) = {
        let unit = ctx
            .world
            .get::<&Unit>(entity)
            .map_err(|_| RejectReason::UnknownUnit)?;
        let ability = unit
            .abilities
            .get(index)
            .cloned()
            .ok_or(RejectReason::NoAbilitySelected)?;
        (ability, unit.cell, unit.supplies, unit.team)
    };

    validate(&ability, unit_cell, supplies, target, ctx.turn, &ctx.map)?;

    // Commit point.
    let turn = ctx.turn;
    if let Ok(mut unit) = ctx.world.get::<&mut Unit>(entity) {
        if let Some(slot) = unit.abilities.get_mut(index) {
            slot.uses_this_turn = effective_uses(&ability, turn) + 1;
            slot.last_turn_used = Some(turn);
        }
        unit.supplies -= ability.supply_cost;
    }

    let mut resolution = Resolution {
        target,
        effective_target: target,
        ..Default::default()
    };
    if ability.kind == AbilityKind::Move {
        match check_move(&ctx.world, &ctx.map, entity, &ability, unit_cell, supplies, target) {
            Ok((path, cost)) => {
                if attach_move(ctx, entity, &path, cost) {
                    resolution.path = path;
                    resolution.path_cost = cost;
                }
            }
            Err(reason) => {
                tracing::debug!(?entity, %reason, "move committed without a path");
                resolution.move_blocked = Some(reason);
            }
        }
    }

    if ability.inaccuracy_radius > 0 {
        let p = 1.0 - chebyshev_distance(unit_cell, target) as f32 * ability.accuracy_falloff;
        if ctx.rng.gen::<f32>() >= p {
            let landed = scatter(&mut ctx.rng, &ctx.map, target, ability.inaccuracy_radius);
            resolution.effective_target = landed;
            resolution.missed = true;
            ctx.emit_about(
                entity,
                GameEvent::ShotMissed {
                    unit: entity_id(entity),
                    intended: target,
                    landed,
                },
            );
        }
    }

    if ability.trajectory == Trajectory::StraightLine {
        resolution.blocking_cell =
            first_blocking_cell(&ctx.world, &ctx.map, unit_cell, resolution.effective_target);
        if let Some(cell) = resolution.blocking_cell {
            tracing::debug!(?cell, "sightline blocked");
            resolution.effective_target = cell;
        }
    }

    if ability.kind == AbilityKind::Rotate {
        rotate(ctx, entity, unit_cell, target);
    }

    if ability.fires_projectile {
        if ability.is_aerial_projectile {
            tracing::debug!(ability = %ability.name, "aerial projectiles have no effect");
        } else {
            apply_projectile(ctx, team, &ability, resolution.effective_target);
        }
    }

    tracing::debug!(
        ?entity,
        ability = %ability.name,
        ?target,
        effective = ?resolution.effective_target,
        "ability committed"
    );
    ctx.emit_about(
        entity,
        GameEvent::AbilityCommitted {
            unit: entity_id(entity),
            ability: ability.name.clone(),
            target,
            effective_target: resolution.effective_target,
        },
    );
    Ok(resolution)
}

/// Attach `path` to `entity` and charge its cost. Nothing is charged when
/// the path cannot be attached.
pub(crate) fn attach_move(
    ctx: &mut GameContext,
    entity: Entity,
    path: &[CellIdx],
    cost: i32,
) -> bool {
    let points = MovePoints {
        cells: path.iter().copied().collect(),
    };
    if let Err(err) = ctx.world.insert_one(entity, points) {
        tracing::warn!(?entity, %err, "could not attach movement path");
        return false;
    }
    match ctx.world.get::<&mut Unit>(entity) {
        Ok(mut unit) => unit.supplies -= cost,
        Err(err) => tracing::warn!(?entity, %err, "could not charge movement cost"),
    }
    true
}

/// Commit the selected unit's selected ability at `target` on behalf of the
/// local player, and queue the matching outbound intent.
pub fn use_selected(ctx: &mut GameContext, target: CellIdx) -> Result<Resolution, RejectReason> {
    let entity = ctx.selected_unit.ok_or(RejectReason::NoUnitSelected)?;
    let (index, team) = {
        let unit = ctx
            .world
            .get::<&Unit>(entity)
            .map_err(|_| RejectReason::UnknownUnit)?;
        (
            unit.selected_ability.ok_or(RejectReason::NoAbilitySelected)?,
            unit.team,
        )
    };
    if team != ctx.local_team {
        return Err(RejectReason::WrongTeam);
    }

    let resolution = use_ability(ctx, entity, index, target)?;
    ctx.outbound.push(NetIntent {
        kind: IntentKind::UseAbility {
            ability_index: index,
        },
        team,
        unit: entity_id(entity),
        destination: target,
    });
    Ok(resolution)
}

/// Resolve an intent received from the peer. The acting team must own the
/// unit.
pub fn apply_intent(ctx: &mut GameContext, intent: &NetIntent) -> Result<Resolution, RejectReason> {
    let entity = entity_from_id(intent.unit)
        .filter(|e| ctx.world.contains(*e))
        .ok_or(RejectReason::UnknownUnit)?;
    let team = ctx
        .world
        .get::<&Unit>(entity)
        .map(|u| u.team)
        .map_err(|_| RejectReason::UnknownUnit)?;
    if team != intent.team {
        return Err(RejectReason::WrongTeam);
    }
    match intent.kind {
        IntentKind::UseAbility { ability_index } => {
            use_ability(ctx, entity, ability_index, intent.destination)
        }
    }
}

/// Uniform pick among the on-map cells around `target`.
fn scatter(rng: &mut ChaCha8Rng, map: &GameMap, target: CellIdx, radius: i32) -> CellIdx {
    let candidates = map.cells_in_rect(&cell_neighbor_rect(target, radius, map.dims()));
    if candidates.is_empty() {
        return target;
    }
    candidates[rng.gen_range(0..candidates.len())]
}

fn rotate(ctx: &mut GameContext, entity: Entity, unit_cell: CellIdx, target: CellIdx) {
    let dims = ctx.map.dims();
    let angle = angle_between_points(cell_center(unit_cell, dims), cell_center(target, dims));
    match ctx.world.get::<&mut IsoscelesTrapezoid>(entity) {
        Ok(mut trapezoid) => trapezoid.facing_angle = angle,
        Err(_) => return,
    }

    vision::position_all_trapezoids(&mut ctx.world, &ctx.map);
    vision::compute_team_vision(ctx);
}

fn roll(rng: &mut ChaCha8Rng, range: DamageRange) -> i32 {
    let (lo, hi) = range.bounds();
    rng.gen_range(lo..=hi)
}

/// Damage every cell the projectile reaches: the effective target, or the
/// square of radius `aoe_size` around it. Each cell is rolled independently.
fn apply_projectile(ctx: &mut GameContext, attacker: Team, ability: &Ability, center: CellIdx) {
    let cells = if ability.aoe_size > 0 {
        ctx.map
            .cells_in_rect(&cell_neighbor_rect(center, ability.aoe_size, ctx.map.dims()))
    } else if ctx.map.in_bounds(center) {
        vec![center]
    } else {
        Vec::new()
    };
    for cell in cells {
        damage_cell(ctx, attacker, ability, cell);
    }
}

fn damage_cell(ctx: &mut GameContext, attacker: Team, ability: &Ability, cell: CellIdx) {
    let position = cell_center(cell, ctx.map.dims());

    let destructible = ctx
        .map
        .obstacle_at(cell)
        .filter(|o| {
            ctx.world
                .get::<&Obstacle>(*o)
                .map(|o| o.is_destructible)
                .unwrap_or(false)
        });
    if let Some(obstacle) = destructible {
        if ability.terrain_damage.bounds().1 > 0 {
            let amount = roll(&mut ctx.rng, ability.terrain_damage);
            if let Ok(mut o) = ctx.world.get::<&mut Obstacle>(obstacle) {
                o.current_health -= amount;
            }
            push_text(ctx, amount, position, attacker, None);
        }
    }

    let Some(target) = ctx.map.unit_at(cell) else {
        return;
    };
    let Some((team, class)) = ctx
        .world
        .get::<&Unit>(target)
        .ok()
        .map(|u| (u.team, u.armor_class()))
    else {
        return;
    };
    let range = match class {
        ArmorClass::Flesh => ability.flesh_damage,
        ArmorClass::Armor => ability.armor_damage,
    };
    if range.bounds().1 <= 0 {
        return;
    }
    let amount = roll(&mut ctx.rng, range);
    if let Ok(mut unit) = ctx.world.get::<&mut Unit>(target) {
        unit.current_health -= amount;
    }
    push_text(ctx, amount, position, attacker, Some(team));
}

fn push_text(
    ctx: &mut GameContext,
    amount: i32,
    position: Vec2,
    attacker: Team,
    target: Option<Team>,
) {
    ctx.combat_texts.push(CombatText {
        text: amount.to_string(),
        position,
        attacker_team: attacker,
        target_team: target,
        dealt_by_local_team: attacker == ctx.local_team,
        fade: true,
        duration_secs: COMBAT_TEXT_DURATION_SECS,
        age_secs: 0.0,
    });
}

/// What committing the selected ability at `hovered` would do. Read-only:
/// no mutation and no random draws.
pub fn preview(ctx: &GameContext, hovered: Option<CellIdx>) -> Option<TargetingPreview> {
    let entity = ctx.selected_unit?;
    let target = hovered.filter(|c| ctx.map.in_bounds(*c))?;
    let unit = ctx.world.get::<&Unit>(entity).ok()?;
    let ability = unit.selected()?;
    let dims = ctx.map.dims();

    let mut rejection = if unit.team != ctx.local_team {
        Some(RejectReason::WrongTeam)
    } else {
        validate(ability, unit.cell, unit.supplies, target, ctx.turn, &ctx.map).err()
    };
    if rejection.is_none() && ability.kind == AbilityKind::Move {
        rejection = check_move(
            &ctx.world,
            &ctx.map,
            entity,
            ability,
            unit.cell,
            unit.supplies,
            target,
        )
        .err();
    }

    let mut preview = TargetingPreview {
        target,
        rejection,
        ..Default::default()
    };
    if ability.trajectory == Trajectory::Bresenham {
        let (path, cost) = plan_path(
            &ctx.world,
            &ctx.map,
            unit.cell,
            target,
            ability.range,
            unit.supplies - ability.supply_cost,
        );
        preview.path = path;
        preview.path_cost = cost;
    }
    if ability.trajectory == Trajectory::StraightLine {
        preview.line = sightline_cells(&ctx.map, unit.cell, target);
        preview.blocking_cell = first_blocking_cell(&ctx.world, &ctx.map, unit.cell, target);
    }
    if ability.range > 0 {
        preview.range_rect = Some(cell_neighbor_rect(unit.cell, ability.range, dims));
    }
    if ability.aoe_size > 0 {
        preview.aoe_rect = Some(cell_neighbor_rect(target, ability.aoe_size, dims));
    }
    if ability.inaccuracy_radius > 0 {
        preview.inaccuracy_rect = Some(cell_neighbor_rect(target, ability.inaccuracy_radius, dims));
    }
    Some(preview)
}
