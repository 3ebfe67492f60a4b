//! Fundamental grid and geometric types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate (column, row).
///
/// Equality and hashing are exact-integer, so `CellIdx` is safe as a map key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIdx {
    pub x: i32,
    pub y: i32,
}

impl CellIdx {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for CellIdx {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Size of one grid cell in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDims {
    pub width: i32,
    pub height: i32,
}

impl CellDims {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Axis-aligned rectangle in world space. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: left/top edges inside, right/bottom edges outside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

/// Circle in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// Trapezoidal vision cone owned by a unit.
///
/// Widths and length are measured in cells. The corner points are world
/// positions and are regenerated whenever the owning unit moves or rotates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoscelesTrapezoid {
    pub base_width: i32,
    pub top_width: i32,
    pub length: i32,
    /// Direction the top edge faces, in degrees (screen space, y down).
    pub facing_angle: f32,
    /// Center of the base edge.
    pub origin: Vec2,
    /// Base left.
    pub p1: Vec2,
    /// Base right.
    pub p2: Vec2,
    /// Top right.
    pub p3: Vec2,
    /// Top left.
    pub p4: Vec2,
}

impl IsoscelesTrapezoid {
    pub fn corners(&self) -> [Vec2; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE as f64
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
