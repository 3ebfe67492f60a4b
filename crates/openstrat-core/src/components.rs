//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Game logic lives in systems, not components.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::templates::AtlasCoords;
use crate::types::CellIdx;

/// A single-cell map obstacle (ground, cliff, wall, crate, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Template key this obstacle was built from.
    pub kind: String,
    pub display_name: String,
    pub class: ObstacleClass,
    pub move_cost: i32,
    pub intrinsic_height: i32,
    pub cell: CellIdx,
    pub is_destructible: bool,
    pub max_health: i32,
    pub current_health: i32,
    pub stops_projectile: bool,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    /// A unit on this cell stands on top of the obstacle rather than beside it.
    pub unit_stands_on_top: bool,
}

/// Inclusive damage range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

impl DamageRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Min/max ordered so a range with swapped bounds still samples correctly.
    pub fn bounds(&self) -> (i32, i32) {
        (self.min.min(self.max), self.min.max(self.max))
    }
}

/// An ability owned by a unit. Not independently addressable: it is always
/// reached through its unit and its index in `Unit::abilities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    /// Key of the ability in the unit template.
    pub name: String,
    pub kind: AbilityKind,
    pub description: String,
    pub targeting: TargetingMode,
    pub trajectory: Trajectory,
    pub supply_cost: i32,
    /// -1 means unlimited.
    pub max_uses_per_turn: i32,
    pub uses_this_turn: i32,
    /// -1 means no cooldown.
    pub max_cooldown: i32,
    /// `None` until the ability is used for the first time.
    pub last_turn_used: Option<i32>,
    /// Chebyshev range in cells. -1 means unlimited.
    pub range: i32,
    pub aoe_size: i32,
    pub flesh_damage: DamageRange,
    pub armor_damage: DamageRange,
    pub terrain_damage: DamageRange,
    pub fires_projectile: bool,
    pub is_aerial_projectile: bool,
    /// Hit probability lost per cell of distance.
    pub accuracy_falloff: f32,
    /// Scatter radius in cells on a miss. 0 disables the accuracy roll.
    pub inaccuracy_radius: i32,
}

/// A unit on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Template key this unit was built from.
    pub kind: String,
    pub description: String,
    pub team: Team,
    pub cell: CellIdx,
    pub intrinsic_height: i32,
    pub crouch_height: i32,
    pub prone_height: i32,
    pub max_supplies: i32,
    pub supplies: i32,
    pub max_health: i32,
    pub current_health: i32,
    pub max_occupancy: i32,
    pub stops_projectile: bool,
    pub stance: Stance,
    pub is_person: bool,
    pub is_vehicle: bool,
    pub is_structure: bool,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    pub abilities: Vec<Ability>,
    /// Index into `abilities`. `None` is the neutral slot.
    pub selected_ability: Option<usize>,
}

impl Unit {
    /// Height contributed by the unit in its current stance.
    pub fn stance_height(&self) -> i32 {
        match self.stance {
            Stance::Standing => self.intrinsic_height,
            Stance::Crouched => self.crouch_height,
            Stance::Prone => self.prone_height,
        }
    }

    /// Damage table this unit is hit on. Vehicles and structures are armored.
    pub fn armor_class(&self) -> ArmorClass {
        if !self.is_person && (self.is_vehicle || self.is_structure) {
            ArmorClass::Armor
        } else {
            ArmorClass::Flesh
        }
    }

    pub fn selected(&self) -> Option<&Ability> {
        self.selected_ability.and_then(|idx| self.abilities.get(idx))
    }
}

/// Committed movement path, consumed one cell per movement tick.
/// A unit carries at most one of these at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovePoints {
    pub cells: VecDeque<CellIdx>,
}

/// Marks an enemy unit as currently visible to the local player's team.
/// Rebuilt from scratch on every vision pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IsVisible;

/// The local player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: Team,
    pub supplies: i32,
}
