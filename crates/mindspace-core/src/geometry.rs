//! Geometry helpers: distances, angles, clamping and grid snapping.

use kurbo::Point;

/// Grid size for snapping (matches the visual board grid).
pub const GRID_SIZE: f64 = 20.0;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in radians of the vector from `a` to `b`.
///
/// Coincident points yield `0.0` (`atan2(0, 0)` is already zero, but negative
/// zero is folded to positive so callers can compare directly).
pub fn angle(a: Point, b: Point) -> f64 {
    let dy = b.y - a.y;
    let dx = b.x - a.x;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    dy.atan2(dx)
}

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics when the bounds are inverted; the
/// lower bound wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Round a single coordinate to the nearest multiple of `grid_size`.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection, each axis independently.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Whether both coordinates are finite.
pub fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_distance() {
        assert!((distance(Point::ZERO, Point::new(3.0, 4.0)) - 5.0).abs() < f64::EPSILON);
        assert!(distance(Point::new(7.0, 7.0), Point::new(7.0, 7.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_angle() {
        assert!((angle(Point::ZERO, Point::new(10.0, 10.0)) - FRAC_PI_4).abs() < 1e-12);
        assert!((angle(Point::ZERO, Point::new(0.0, 5.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle(Point::ZERO, Point::new(-5.0, 0.0)) - PI).abs() < 1e-12);
        assert_eq!(angle(Point::new(3.0, 3.0), Point::new(3.0, 3.0)), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(3.0, 0.5, 2.0), 2.0);
        assert_eq!(clamp(-1.0, 0.5, 2.0), 0.5);
        assert_eq!(clamp(1.2, 0.5, 2.0), 1.2);
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(Point::new(23.0, 47.0), 20.0), Point::new(20.0, 40.0));
        assert_eq!(snap_to_grid(Point::new(40.0, 60.0), 20.0), Point::new(40.0, 60.0));
        assert_eq!(snap_to_grid(Point::new(31.0, 51.0), 20.0), Point::new(40.0, 60.0));
        assert_eq!(snap_to_grid(Point::new(-31.0, -9.0), 20.0), Point::new(-40.0, -0.0));
    }

    #[test]
    fn test_snap_is_idempotent() {
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(9.99, 10.0),
            Point::new(-123.4, 567.8),
            Point::new(1e6 + 0.3, -1e-3),
        ];
        for grid in [1.0, 7.0, 20.0, 33.3] {
            for p in samples {
                let once = snap_to_grid(p, grid);
                let twice = snap_to_grid(once, grid);
                assert!((once.x - twice.x).abs() < 1e-9, "{p:?} grid {grid}");
                assert!((once.y - twice.y).abs() < 1e-9, "{p:?} grid {grid}");
            }
        }
    }

    #[test]
    fn test_snap_ignores_degenerate_grid() {
        let p = Point::new(13.0, 17.0);
        assert_eq!(snap_to_grid(p, 0.0), p);
        assert_eq!(snap_to_grid(p, -5.0), p);
    }
}
