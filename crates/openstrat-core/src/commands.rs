//! Input events and network intents consumed by the simulation.
//!
//! Input is queued and processed at the next tick boundary; the core never
//! polls devices itself.

use serde::{Deserialize, Serialize};

use crate::enums::Team;
use crate::types::{CellIdx, Rect};

/// Abstracted player input, already converted from screen to cell space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    /// Primary action (left click): select or deselect the unit on `cell`.
    PrimaryAction { cell: CellIdx },
    /// Secondary action (right click): commit the selected ability at `cell`.
    SecondaryAction { cell: CellIdx },
    /// Cursor now hovers `cell`. Drives the targeting preview.
    HoverCell { cell: CellIdx },
    /// Cursor left the map or the window.
    ClearHover,
    SelectNextAbility,
    SelectPreviousAbility,
    /// Deselect the current unit.
    Deselect,
    /// World-space rectangle currently visible on screen.
    SetViewport { rect: Rect },
    /// Advance to the next turn.
    EndTurn,
}

/// Kind of a networked intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentKind {
    /// Use ability `ability_index` of the intent's unit, targeting the
    /// destination cell.
    UseAbility { ability_index: usize },
}

/// A move/ability intent exchanged with a peer. Transport and encoding are
/// the network collaborator's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetIntent {
    pub kind: IntentKind,
    /// Team issuing the intent. Must own `unit`.
    pub team: Team,
    /// Entity reference (hecs entity bits).
    pub unit: u64,
    pub destination: CellIdx,
}
