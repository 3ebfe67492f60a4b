//! Grid/world conversion, distance metrics, line walks and 2D rotation.
//!
//! Pure functions. Nothing here validates game-state preconditions such as
//! map bounds; callers are responsible for that.

use std::collections::HashSet;

use glam::Vec2;

use openstrat_core::constants::{LINE_SAMPLE_STEP, NORTH_ANGLE_DEG};
use openstrat_core::types::{CellDims, CellIdx, Circle, IsoscelesTrapezoid, Rect};

/// World position to the cell containing it (floor division).
pub fn world_to_map(pos: Vec2, dims: CellDims) -> CellIdx {
    CellIdx::new(
        (pos.x / dims.width as f32).floor() as i32,
        (pos.y / dims.height as f32).floor() as i32,
    )
}

/// Top-left corner of a cell in world space.
pub fn map_to_world(cell: CellIdx, dims: CellDims) -> Vec2 {
    Vec2::new(
        (cell.x * dims.width) as f32,
        (cell.y * dims.height) as f32,
    )
}

pub fn cell_rect(cell: CellIdx, dims: CellDims) -> Rect {
    let origin = map_to_world(cell, dims);
    Rect::new(origin.x, origin.y, dims.width as f32, dims.height as f32)
}

pub fn cell_center(cell: CellIdx, dims: CellDims) -> Vec2 {
    cell_rect(cell, dims).center()
}

/// King-move distance: `max(|dx|, |dy|)`.
pub fn chebyshev_distance(a: CellIdx, b: CellIdx) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Every cell on the integer line from `start` to `end`, both inclusive.
pub fn bresenham_cells(start: CellIdx, end: CellIdx) -> Vec<CellIdx> {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);
    let (mut x, mut y) = (start.x, start.y);
    let mut err = dx - dy;

    loop {
        cells.push(CellIdx::new(x, y));
        if x == end.x && y == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    cells
}

/// Cells visited by a world-space line, sampled every `LINE_SAMPLE_STEP`
/// units, deduplicated in visiting order. The end point is always sampled.
pub fn cells_overlapping_line(start: Vec2, end: Vec2, dims: CellDims) -> Vec<CellIdx> {
    let delta = end - start;
    let length = delta.length();
    let direction = delta.normalize_or_zero();

    let mut cells = Vec::new();
    let mut seen = HashSet::new();
    let mut visit = |pos: Vec2| {
        let cell = world_to_map(pos, dims);
        if seen.insert(cell) {
            cells.push(cell);
        }
    };

    let steps = (length / LINE_SAMPLE_STEP).floor() as u32;
    for i in 0..=steps {
        visit(start + direction * (i as f32 * LINE_SAMPLE_STEP));
    }
    visit(end);

    cells
}

/// Square of `(2 * radius + 1)` cells centered on `center`, in world space.
pub fn cell_neighbor_rect(center: CellIdx, radius: i32, dims: CellDims) -> Rect {
    let side = radius * 2 + 1;
    Rect::new(
        ((center.x - radius) * dims.width) as f32,
        ((center.y - radius) * dims.height) as f32,
        (side * dims.width) as f32,
        (side * dims.height) as f32,
    )
}

/// Cells whose center lies inside `rect`.
pub fn cells_overlapping_rect(rect: &Rect, dims: CellDims) -> Vec<CellIdx> {
    let top_left = world_to_map(Vec2::new(rect.x, rect.y), dims);
    let bottom_right = world_to_map(
        Vec2::new(rect.x + rect.width, rect.y + rect.height),
        dims,
    );

    let mut cells = Vec::new();
    for row in top_left.y..=bottom_right.y {
        for col in top_left.x..=bottom_right.x {
            let cell = CellIdx::new(col, row);
            if rect.contains(cell_center(cell, dims)) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Circle snapped to the grid: radius 0 means half a cell, otherwise
/// `grid_radius` whole cells.
pub fn grid_bound_circle(center: Vec2, grid_radius: i32, dims: CellDims) -> Circle {
    let radius = if grid_radius == 0 {
        dims.width as f32 / 2.0
    } else {
        (grid_radius * dims.width) as f32
    };
    Circle { center, radius }
}

/// Cells whose center lies inside (or on) `circle`.
pub fn cells_overlapping_circle(circle: &Circle, dims: CellDims) -> Vec<CellIdx> {
    let r = Vec2::splat(circle.radius);
    let top_left = world_to_map(circle.center - r, dims);
    let bottom_right = world_to_map(circle.center + r, dims);
    let radius_sq = circle.radius * circle.radius;

    let mut cells = Vec::new();
    for row in top_left.y..=bottom_right.y {
        for col in top_left.x..=bottom_right.x {
            let cell = CellIdx::new(col, row);
            if cell_center(cell, dims).distance_squared(circle.center) <= radius_sq {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Rotate `point` around `origin` by `angle_deg` degrees.
pub fn rotate_point(origin: Vec2, point: Vec2, angle_deg: f32) -> Vec2 {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let p = point - origin;
    Vec2::new(p.x * c - p.y * s, p.x * s + p.y * c) + origin
}

/// Rotate all four corners around the trapezoid's origin.
pub fn rotate_trapezoid(trapezoid: &mut IsoscelesTrapezoid, angle_deg: f32) {
    let origin = trapezoid.origin;
    trapezoid.p1 = rotate_point(origin, trapezoid.p1, angle_deg);
    trapezoid.p2 = rotate_point(origin, trapezoid.p2, angle_deg);
    trapezoid.p3 = rotate_point(origin, trapezoid.p3, angle_deg);
    trapezoid.p4 = rotate_point(origin, trapezoid.p4, angle_deg);
}

/// Angle of the vector `p1 -> p2` in degrees, in (-180, 180].
pub fn angle_between_points(p1: Vec2, p2: Vec2) -> f32 {
    let d = p2 - p1;
    d.y.atan2(d.x).to_degrees()
}

/// Shortest signed rotation from `from_deg` to `to_deg`, in [-180, 180].
pub fn angle_difference(from_deg: f32, to_deg: f32) -> f32 {
    let diff = (to_deg - from_deg) % 360.0;
    if diff < -180.0 {
        diff + 360.0
    } else if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Vision trapezoid with its base centered on `origin`, built facing north
/// and rotated to `facing_deg`. Widths and length are in cells.
pub fn build_trapezoid(
    origin: Vec2,
    base_width: i32,
    top_width: i32,
    length: i32,
    facing_deg: f32,
    cell_width: f32,
) -> IsoscelesTrapezoid {
    let half_base = base_width as f32 / 2.0 * cell_width;
    let half_top = top_width as f32 / 2.0 * cell_width;
    let reach = length as f32 * cell_width;

    let mut trapezoid = IsoscelesTrapezoid {
        base_width,
        top_width,
        length,
        facing_angle: facing_deg,
        origin,
        p1: Vec2::new(origin.x - half_base, origin.y),
        p2: Vec2::new(origin.x + half_base, origin.y),
        p3: Vec2::new(origin.x + half_top, origin.y - reach),
        p4: Vec2::new(origin.x - half_top, origin.y - reach),
    };
    rotate_trapezoid(&mut trapezoid, angle_difference(NORTH_ANGLE_DEG, facing_deg));
    trapezoid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DIMS: CellDims = CellDims::new(32, 32);

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_world_to_map_floors_negative() {
        assert_eq!(world_to_map(Vec2::new(-0.5, 31.9), DIMS), CellIdx::new(-1, 0));
        assert_eq!(world_to_map(Vec2::new(64.0, 95.9), DIMS), CellIdx::new(2, 2));
    }

    #[test]
    fn test_cell_center() {
        assert_eq!(cell_center(CellIdx::new(1, 2), DIMS), Vec2::new(48.0, 80.0));
    }

    #[test]
    fn test_bresenham_single_cell() {
        let a = CellIdx::new(4, 7);
        assert_eq!(bresenham_cells(a, a), vec![a]);
    }

    #[test]
    fn test_bresenham_horizontal() {
        let cells = bresenham_cells(CellIdx::new(2, 2), CellIdx::new(5, 2));
        assert_eq!(
            cells,
            vec![
                CellIdx::new(2, 2),
                CellIdx::new(3, 2),
                CellIdx::new(4, 2),
                CellIdx::new(5, 2)
            ]
        );
    }

    #[test]
    fn test_bresenham_diagonal() {
        let cells = bresenham_cells(CellIdx::new(0, 0), CellIdx::new(3, -3));
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3], CellIdx::new(3, -3));
    }

    #[test]
    fn test_cells_overlapping_line_dedup_in_order() {
        let start = cell_center(CellIdx::new(0, 0), DIMS);
        let end = cell_center(CellIdx::new(3, 0), DIMS);
        let cells = cells_overlapping_line(start, end, DIMS);
        assert_eq!(
            cells,
            vec![
                CellIdx::new(0, 0),
                CellIdx::new(1, 0),
                CellIdx::new(2, 0),
                CellIdx::new(3, 0)
            ]
        );
    }

    #[test]
    fn test_cells_overlapping_line_zero_length() {
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(cells_overlapping_line(p, p, DIMS), vec![CellIdx::new(0, 0)]);
    }

    #[test]
    fn test_neighbor_rect_cells() {
        let rect = cell_neighbor_rect(CellIdx::new(5, 5), 1, DIMS);
        let cells = cells_overlapping_rect(&rect, DIMS);
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&CellIdx::new(4, 4)));
        assert!(cells.contains(&CellIdx::new(6, 6)));
        assert!(!cells.contains(&CellIdx::new(7, 5)));
    }

    #[test]
    fn test_circle_cells() {
        let circle = grid_bound_circle(cell_center(CellIdx::new(5, 5), DIMS), 1, DIMS);
        let cells = cells_overlapping_circle(&circle, DIMS);
        // Center plus the four orthogonal neighbours; diagonals are sqrt(2) cells away.
        assert_eq!(cells.len(), 5);
        assert!(cells.contains(&CellIdx::new(5, 4)));
        assert!(!cells.contains(&CellIdx::new(6, 6)));

        let small = grid_bound_circle(cell_center(CellIdx::new(5, 5), DIMS), 0, DIMS);
        assert_eq!(small.radius, 16.0);
        assert_eq!(cells_overlapping_circle(&small, DIMS), vec![CellIdx::new(5, 5)]);
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let rotated = rotate_point(Vec2::ZERO, Vec2::new(1.0, 0.0), 90.0);
        assert!(approx(rotated, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_angle_between_points() {
        assert_eq!(angle_between_points(Vec2::ZERO, Vec2::new(1.0, 0.0)), 0.0);
        assert!((angle_between_points(Vec2::ZERO, Vec2::new(0.0, -1.0)) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert_eq!(angle_difference(-90.0, 0.0), 90.0);
        assert_eq!(angle_difference(170.0, -170.0), 20.0);
        assert_eq!(angle_difference(-170.0, 170.0), -20.0);
        assert_eq!(angle_difference(-90.0, -90.0), 0.0);
    }

    #[test]
    fn test_build_trapezoid_facing_north() {
        let origin = Vec2::new(48.0, 48.0);
        let trap = build_trapezoid(origin, 1, 3, 2, NORTH_ANGLE_DEG, 32.0);
        assert!(approx(trap.p1, Vec2::new(32.0, 48.0)));
        assert!(approx(trap.p2, Vec2::new(64.0, 48.0)));
        assert!(approx(trap.p3, Vec2::new(96.0, -16.0)));
        assert!(approx(trap.p4, Vec2::new(0.0, -16.0)));
    }

    #[test]
    fn test_build_trapezoid_facing_east() {
        let origin = Vec2::new(0.0, 0.0);
        let trap = build_trapezoid(origin, 1, 1, 2, 0.0, 32.0);
        // Top edge now lies two cells east of the origin.
        assert!(approx(trap.p3, Vec2::new(64.0, 16.0)));
        assert!(approx(trap.p4, Vec2::new(64.0, -16.0)));
    }

    proptest! {
        #[test]
        fn prop_world_map_round_trip(x in -500i32..500, y in -500i32..500, w in 1i32..128, h in 1i32..128) {
            let dims = CellDims::new(w, h);
            let cell = CellIdx::new(x, y);
            prop_assert_eq!(world_to_map(map_to_world(cell, dims), dims), cell);
            prop_assert_eq!(world_to_map(cell_center(cell, dims), dims), cell);
        }

        #[test]
        fn prop_chebyshev_identity_and_symmetry(ax in -100i32..100, ay in -100i32..100, bx in -100i32..100, by in -100i32..100) {
            let a = CellIdx::new(ax, ay);
            let b = CellIdx::new(bx, by);
            prop_assert_eq!(chebyshev_distance(a, a), 0);
            prop_assert_eq!(chebyshev_distance(a, b), chebyshev_distance(b, a));
        }

        #[test]
        fn prop_bresenham_endpoints_and_length(ax in -50i32..50, ay in -50i32..50, bx in -50i32..50, by in -50i32..50) {
            let a = CellIdx::new(ax, ay);
            let b = CellIdx::new(bx, by);
            let cells = bresenham_cells(a, b);
            prop_assert_eq!(cells[0], a);
            prop_assert_eq!(*cells.last().unwrap(), b);
            prop_assert!(cells.len() as i32 >= chebyshev_distance(a, b) + 1);
            for pair in cells.windows(2) {
                prop_assert_eq!(chebyshev_distance(pair[0], pair[1]), 1);
            }
        }

        #[test]
        fn prop_angle_difference_in_range(a in -720.0f32..720.0, b in -720.0f32..720.0) {
            let d = angle_difference(a, b);
            prop_assert!((-180.0..=180.0).contains(&d));
        }
    }
}
