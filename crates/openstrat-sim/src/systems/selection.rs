//! Unit selection and ability cycling.

use openstrat_core::components::Unit;
use openstrat_core::events::GameEvent;
use openstrat_core::types::CellIdx;

use crate::context::{entity_id, GameContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Previous,
}

/// Primary action on `cell`: toggle selection of the unit there, or clear
/// the selection when the cell is empty. Enemy units the local team cannot
/// see count as absent.
pub fn primary_action(ctx: &mut GameContext, cell: CellIdx) {
    match ctx.map.unit_at(cell).filter(|e| ctx.knows(*e)) {
        Some(entity) if ctx.selected_unit == Some(entity) => deselect(ctx),
        Some(entity) => {
            ctx.selected_unit = Some(entity);
            ctx.emit(GameEvent::UnitSelected {
                unit: entity_id(entity),
            });
        }
        None => deselect(ctx),
    }
}

pub fn deselect(ctx: &mut GameContext) {
    if ctx.selected_unit.take().is_some() {
        ctx.emit(GameEvent::UnitDeselected);
    }
}

/// Next index when cycling through `len` abilities plus the neutral slot
/// (`None`). Forward: `0, 1, .., len-1, None, 0, ..`; backward is the mirror.
pub fn cycle_index(current: Option<usize>, len: usize, direction: CycleDirection) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (direction, current) {
        (CycleDirection::Next, None) => Some(0),
        (CycleDirection::Next, Some(i)) if i + 1 < len => Some(i + 1),
        (CycleDirection::Next, Some(_)) => None,
        (CycleDirection::Previous, None) => Some(len - 1),
        (CycleDirection::Previous, Some(0)) => None,
        (CycleDirection::Previous, Some(i)) => Some((i - 1).min(len - 1)),
    }
}

/// Move the selected unit's ability cursor. No-op without a selection.
pub fn cycle_ability(ctx: &mut GameContext, direction: CycleDirection) {
    let Some(entity) = ctx.selected_unit else {
        return;
    };
    let index = match ctx.world.get::<&mut Unit>(entity) {
        Ok(mut unit) => {
            let next = cycle_index(unit.selected_ability, unit.abilities.len(), direction);
            unit.selected_ability = next;
            next
        }
        Err(_) => return,
    };
    ctx.emit(GameEvent::AbilitySelected {
        unit: entity_id(entity),
        index,
    });
}
