//! Collision tests: separating-axis polygon overlap and ray vs. box.

use glam::{Vec2, Vec3};

use openstrat_core::types::{CellDims, CellIdx, IsoscelesTrapezoid, Rect};

use crate::geometry::{cell_center, map_to_world};

/// Project a convex polygon onto `axis`, returning `(min, max)`.
fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

fn separated_on_edges_of(shape: &[Vec2], a: &[Vec2], b: &[Vec2]) -> bool {
    for i in 0..shape.len() {
        let edge = shape[(i + 1) % shape.len()] - shape[i];
        // Degenerate edges contribute no axis.
        let axis = edge.perp().normalize_or_zero();
        if axis == Vec2::ZERO {
            continue;
        }
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        if max_a < min_b || max_b < min_a {
            return true;
        }
    }
    false
}

/// Separating-axis overlap test for two convex polygons. Touching counts as
/// overlapping.
pub fn polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    !separated_on_edges_of(a, a, b) && !separated_on_edges_of(b, a, b)
}

pub fn trapezoid_rect_collision(trapezoid: &IsoscelesTrapezoid, rect: &Rect) -> bool {
    polygons_overlap(&trapezoid.corners(), &rect.corners())
}

/// Axis-aligned box in (x, y, height) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Column covering one cell footprint from the ground up to `height`.
    pub fn cell_column(cell: CellIdx, dims: CellDims, height: f32) -> Self {
        let origin = map_to_world(cell, dims);
        Self {
            min: origin.extend(0.0),
            max: (origin + dims.as_vec2()).extend(height),
        }
    }

    /// Shrink the footprint on every side and lower the top by `amount`.
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            min: Vec3::new(self.min.x + amount, self.min.y + amount, self.min.z),
            max: Vec3::new(self.max.x - amount, self.max.y - amount, self.max.z - amount),
        }
    }
}

/// Center of a cell's top face at `height`.
pub fn column_top(cell: CellIdx, dims: CellDims, height: f32) -> Vec3 {
    cell_center(cell, dims).extend(height)
}

/// Ray segment with a unit (or zero) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `from` toward `to`, with the distance between them.
    pub fn between(from: Vec3, to: Vec3) -> (Self, f32) {
        let delta = to - from;
        (
            Self {
                origin: from,
                direction: delta.normalize_or_zero(),
            },
            delta.length(),
        )
    }
}

/// Slab test. Returns the distance along the ray to the first contact with
/// the box, or `None` if the ray misses it. Hits behind the origin are ignored.
pub fn ray_box_intersection(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let mut t_near = 0.0_f32;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if dir.abs() < f32::EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let mut t0 = (lo - origin) * inv;
        let mut t1 = (hi - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    Some(t_near)
}
