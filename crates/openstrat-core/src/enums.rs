//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Team affiliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Blue,
    Red,
}

impl Team {
    /// The opposing team.
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }
}

/// Unit posture. Selects which height field a unit contributes to its cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Standing,
    Crouched,
    Prone,
}

/// Whether an ability needs a target cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingMode {
    #[default]
    None,
    Cell,
}

/// How an ability walks cells toward its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    #[default]
    None,
    /// Integer line walk. Used for movement paths.
    Bresenham,
    /// Sampled world-space line. Used for ranged-attack sightlines.
    StraightLine,
}

/// Ability behavior selected by the template's `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AbilityKind {
    Move,
    Rotate,
    /// Any other ability; its effect is driven purely by its flags.
    Action,
}

impl From<String> for AbilityKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "move" => AbilityKind::Move,
            "rotate" => AbilityKind::Rotate,
            _ => AbilityKind::Action,
        }
    }
}

/// Obstacle class relevant to height composition and movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleClass {
    #[default]
    Standard,
    Cliff,
    Wall,
}

impl ObstacleClass {
    /// Classify by the template's display name.
    pub fn from_display_name(name: &str) -> Self {
        match name {
            "cliff" => ObstacleClass::Cliff,
            "wall" => ObstacleClass::Wall,
            _ => ObstacleClass::Standard,
        }
    }

    /// Cliffs and walls take their height from the terrain level alone.
    pub fn is_terrain_step(self) -> bool {
        matches!(self, ObstacleClass::Cliff | ObstacleClass::Wall)
    }
}

/// Damage table a unit is hit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorClass {
    Flesh,
    Armor,
}

/// Why an ability use (or other action) was refused. The game state is
/// unchanged whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum RejectReason {
    #[error("no unit selected")]
    NoUnitSelected,
    #[error("no ability selected")]
    NoAbilitySelected,
    #[error("target cell is outside the map")]
    TargetOutOfBounds,
    #[error("not enough supplies")]
    InsufficientSupplies,
    #[error("ability max uses per turn reached")]
    MaxUsesReached,
    #[error("ability on cooldown")]
    OnCooldown,
    #[error("ability out of range")]
    OutOfRange,
    #[error("unit is already moving")]
    MoveInProgress,
    #[error("no reachable cell on the path")]
    NoPath,
    #[error("path ends on a cliff")]
    PathEndsOnCliff,
    #[error("unit does not exist")]
    UnknownUnit,
    #[error("unit belongs to another team")]
    WrongTeam,
}
