//! Events emitted by the simulation for UI feedback.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{RejectReason, Team};
use crate::types::CellIdx;

/// Discrete things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    UnitSelected { unit: u64 },
    UnitDeselected,
    AbilitySelected { unit: u64, index: Option<usize> },
    AbilityRejected { unit: Option<u64>, reason: RejectReason },
    AbilityCommitted {
        unit: u64,
        ability: String,
        target: CellIdx,
        /// Cell the effect actually landed on after scatter and LOS.
        effective_target: CellIdx,
    },
    /// The accuracy roll failed and the shot scattered.
    ShotMissed { unit: u64, intended: CellIdx, landed: CellIdx },
    UnitMoved { unit: u64, from: CellIdx, to: CellIdx },
    UnitsSwapped { unit: u64, other: u64 },
    UnitDestroyed { unit: u64, cell: CellIdx },
    ObstacleDestroyed { cell: CellIdx },
    TurnAdvanced { turn: i32 },
}

/// Floating damage number.
///
/// Carries both teams so the render collaborator can color it relative to
/// the local player (friendly-dealt vs. enemy-dealt).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatText {
    pub text: String,
    /// World position the text is anchored at.
    pub position: Vec2,
    pub attacker_team: Team,
    /// `None` when the target was an obstacle.
    pub target_team: Option<Team>,
    /// True when the local player's team dealt the damage.
    pub dealt_by_local_team: bool,
    pub fade: bool,
    pub duration_secs: f64,
    pub age_secs: f64,
}

impl CombatText {
    pub fn is_expired(&self) -> bool {
        self.age_secs >= self.duration_secs
    }
}
