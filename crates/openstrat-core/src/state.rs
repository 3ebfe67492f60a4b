//! Frame snapshot: everything the render collaborator receives each tick.
//!
//! Only what the local team may know is included: enemy units appear only
//! while tagged visible, and vision cones are published for friendly units
//! only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{CombatText, GameEvent};
use crate::templates::AtlasCoords;
use crate::types::{CellIdx, Rect, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: SimTime,
    pub turn: i32,
    pub local_team: Team,
    pub player: PlayerView,
    pub selected_unit: Option<u64>,
    pub units: Vec<UnitView>,
    pub cells_in_view: Vec<CellIdx>,
    pub obstacles_in_view: Vec<ObstacleView>,
    pub vision_cones: Vec<VisionConeView>,
    pub combat_texts: Vec<CombatText>,
    pub events: Vec<GameEvent>,
    pub hovered_cell: Option<CellInfoView>,
    pub targeting: Option<TargetingPreview>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub team: Team,
    pub supplies: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: u64,
    pub kind: String,
    pub team: Team,
    pub cell: CellIdx,
    pub current_health: i32,
    pub max_health: i32,
    pub supplies: i32,
    pub max_supplies: i32,
    pub stance: Stance,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    pub selected_ability: Option<usize>,
    pub abilities: Vec<AbilityView>,
    pub moving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityView {
    pub name: String,
    pub description: String,
    pub supply_cost: i32,
    pub range: i32,
    /// Turns left before the ability can be used again (0 = ready).
    pub cooldown_remaining: i32,
    /// Uses left this turn, `None` when unlimited.
    pub uses_remaining: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleView {
    pub cell: CellIdx,
    pub kind: String,
    pub display_name: String,
    pub atlas_id: i32,
    pub atlas_coords: AtlasCoords,
    pub current_health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConeView {
    pub unit: u64,
    pub corners: [Vec2; 4],
}

/// Height and occupancy breakdown for one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellInfoView {
    pub cell: CellIdx,
    pub obstacle_name: Option<String>,
    pub unit: Option<u64>,
    pub terrain_level: i32,
    pub terrain_height: i32,
    pub obstacle_height: i32,
    pub unit_height: i32,
    pub total_height: i32,
}

/// What the selected ability would do if committed at the hovered cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetingPreview {
    pub target: CellIdx,
    /// Truncated movement path (Bresenham abilities).
    pub path: Vec<CellIdx>,
    pub path_cost: i32,
    /// Sampled sightline cells (straight-line abilities).
    pub line: Vec<CellIdx>,
    pub blocking_cell: Option<CellIdx>,
    pub range_rect: Option<Rect>,
    pub aoe_rect: Option<Rect>,
    pub inaccuracy_rect: Option<Rect>,
    /// Why the commit would be refused, if it would.
    pub rejection: Option<RejectReason>,
}
