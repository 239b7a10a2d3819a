// src/geometry.rs - 2D point and segment helpers shared by hit-testing and rendering

use serde::{Deserialize, Serialize};

/// Lengths below this are treated as a degenerate (zero-length) segment
pub const DEGENERATE_LENGTH: f64 = 1e-9;

/// A point in either image pixel space or canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        point_distance(self, other)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Vector from `self` to `other`
    pub fn delta_to(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Point at fraction `t` of the way from `self` to `other`
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Canvas-space rectangle produced by the text-box primitive
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }

    /// Midpoints of the top, left, bottom and right edges, in that order
    pub fn edge_midpoints(&self) -> [Point; 4] {
        let center_x = self.left + self.width / 2.0;
        let center_y = self.top + self.height / 2.0;
        [
            Point::new(center_x, self.top),
            Point::new(self.left, center_y),
            Point::new(center_x, self.top + self.height),
            Point::new(self.left + self.width, center_y),
        ]
    }
}

pub fn point_distance(a: Point, b: Point) -> f64 {
    let (dx, dy) = a.delta_to(b);
    (dx * dx + dy * dy).sqrt()
}

/// Shortest distance from `point` to the segment `start..end`
pub fn segment_distance_to_point(start: Point, end: Point, point: Point) -> f64 {
    let (vx, vy) = start.delta_to(end);
    let length_sq = vx * vx + vy * vy;

    if length_sq < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
        return point_distance(start, point);
    }

    let (wx, wy) = start.delta_to(point);
    let t = ((wx * vx + wy * vy) / length_sq).clamp(0.0, 1.0);
    point_distance(start.lerp(end, t), point)
}

/// First candidate with the smallest distance to `target`
pub fn find_closest_point(candidates: &[Point], target: Point) -> Option<Point> {
    let mut closest: Option<(Point, f64)> = None;

    for &candidate in candidates {
        let distance = point_distance(candidate, target);
        match closest {
            Some((_, best)) if best <= distance => {}
            _ => closest = Some((candidate, distance)),
        }
    }

    closest.map(|(point, _)| point)
}

/// Unit vector along `start -> end`, or `None` for a zero-length segment
pub fn unit_direction(start: Point, end: Point) -> Option<(f64, f64)> {
    let (dx, dy) = start.delta_to(end);
    let length = (dx * dx + dy * dy).sqrt();

    if length < DEGENERATE_LENGTH {
        return None;
    }

    Some((dx / length, dy / length))
}

/// Unit vector perpendicular to `start -> end`: `(dx, dy)` rotated to `(-dy, dx)`
pub fn perpendicular_unit(start: Point, end: Point) -> Option<(f64, f64)> {
    let (ux, uy) = unit_direction(start, end)?;
    Some((-uy, ux))
}
