//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz). One tick per rendered frame.
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Map ---

/// Obstacle template that replaces destroyed obstacles.
pub const GROUND_OBSTACLE: &str = "ground";

// --- Vision ---

/// Reference "north" angle in degrees (screen space, y grows downward).
/// Vision trapezoids are built facing this way, then rotated.
pub const NORTH_ANGLE_DEG: f32 = -90.0;

/// Facing angle given to newly spawned units.
pub const DEFAULT_FACING_DEG: f32 = NORTH_ANGLE_DEG;

// --- Line of sight ---

/// Spacing between samples when walking a world-space line (world units).
pub const LINE_SAMPLE_STEP: f32 = 1.0;

/// Inset applied to cell boxes in LOS tests so grazing contact
/// (shared edges, corners, a ray resting on a box top) does not block.
pub const LOS_BOX_INSET: f32 = 1e-3;

// --- Combat text ---

/// How long a floating damage number stays on screen (seconds).
pub const COMBAT_TEXT_DURATION_SECS: f64 = 1.5;

// --- Player ---

pub const DEFAULT_PLAYER_NAME: &str = "Player 1";

pub const DEFAULT_PLAYER_SUPPLIES: i32 = 100;
