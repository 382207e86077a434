//! Motion Geometry Solver
//!
//! Finds the point reached by moving an exact distance from a start point,
//! either toward a destination point or along a compass direction.
//!
//! ## Line / Circle Intersection
//!
//! Toward a destination, the next position lies on the line through start
//! and destination, and on the circle of radius `distance` around start:
//!
//! ```text
//! y = m·x + b
//! (x - x₀)² + (y - y₀)² = d²
//!
//! ⇒ (1 + m²)·x² + 2·(m·(b - y₀) - x₀)·x + (x₀² + (b - y₀)² - d²) = 0
//! ```
//!
//! The system is solved relative to start, so x₀ = y₀ = b = 0 there.
//!
//! Vertical lines have no slope and are handled separately.
//!
//! ## Root Selection
//!
//! The quadratic has two roots, one behind and one ahead of start. They are
//! chosen by a fixed, order-sensitive policy that callers depend on:
//!
//! 1. a root with non-negative X wins; two negative-X roots are no solution
//! 2. if one root has negative Y, the other wins
//! 3. otherwise the root closer (Manhattan) to the destination wins

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::direction::Direction;
use super::point::Point;

/// Horizontal separation below which a line is treated as vertical.
pub const VERTICAL_EPSILON: f64 = 1e-9;

/// Failure to place a point at the requested distance.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// The line/circle system has no usable real root.
    #[error("no solution moving {distance} from {start} toward {destination}")]
    NoSolution {
        /// Start of the motion
        start: Point,
        /// Point being moved toward
        destination: Point,
        /// Requested travel distance
        distance: f64,
    },

    /// Distance is negative or not finite.
    #[error("invalid travel distance {0}")]
    InvalidDistance(f64),
}

/// Where a motion is headed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// Toward a fixed point
    Point(Point),
    /// Along a compass direction
    Direction(Direction),
}

/// One motion query, consumed immediately by [`MotionRequest::resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionRequest {
    /// Current position
    pub start: Point,
    /// Destination point or direction
    pub target: Target,
    /// Distance to travel this step
    pub distance: f64,
    /// Never travel past a destination point
    pub clamp_to_destination: bool,
}

impl MotionRequest {
    /// Solve this request.
    pub fn resolve(&self) -> Result<Point, GeometryError> {
        resolve_next_position(self.start, self.target, self.distance, self.clamp_to_destination)
    }
}

/// Point reached by moving `distance` from `start` toward `target`.
///
/// With `clamp_to_destination`, a point target is never overshot on either
/// axis. Directions ignore the clamp flag.
pub fn resolve_next_position(
    start: Point,
    target: Target,
    distance: f64,
    clamp_to_destination: bool,
) -> Result<Point, GeometryError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(GeometryError::InvalidDistance(distance));
    }

    match target {
        Target::Direction(direction) => {
            let (dx, dy) = direction.delta(distance);
            Ok(start.offset(dx, dy))
        }
        Target::Point(destination) => {
            point_toward(start, destination, distance, clamp_to_destination)
        }
    }
}

fn point_toward(
    start: Point,
    destination: Point,
    distance: f64,
    clamp: bool,
) -> Result<Point, GeometryError> {
    if start == destination {
        return Ok(destination);
    }
    if distance == 0.0 {
        return Ok(start);
    }

    if (destination.x - start.x).abs() < VERTICAL_EPSILON {
        return Ok(vertical_step(start, destination, distance, clamp));
    }

    let no_solution = GeometryError::NoSolution {
        start,
        destination,
        distance,
    };

    // Solved in a frame centred on start (x₀ = y₀ = 0), where the intercept
    // vanishes. Absolute coordinates make b² and 4ac nearly cancel.
    let slope = (destination.y - start.y) / (destination.x - start.x);
    let intercept = 0.0;

    let a = 1.0 + slope * slope;
    let b = 2.0 * slope * intercept;
    let c = intercept * intercept - distance * distance;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return Err(no_solution);
    }

    let root = discriminant.sqrt();
    let u_plus = (-b + root) / (2.0 * a);
    let u_minus = (-b - root) / (2.0 * a);
    let plus = start.offset(u_plus, slope * u_plus + intercept);
    let minus = start.offset(u_minus, slope * u_minus + intercept);

    let chosen = select_root(plus, minus, destination).ok_or(no_solution)?;

    Ok(if clamp {
        Point::new(
            clamp_axis(start.x, destination.x, chosen.x),
            clamp_axis(start.y, destination.y, chosen.y),
        )
    } else {
        chosen
    })
}

fn vertical_step(start: Point, destination: Point, distance: f64, clamp: bool) -> Point {
    let remaining = (destination.y - start.y).abs();
    // Sub-epsilon X offset only: already there
    if remaining == 0.0 || (clamp && remaining < distance) {
        return destination;
    }
    let sign = if destination.y >= start.y { 1.0 } else { -1.0 };
    Point::new(start.x, start.y + sign * distance)
}

/// Apply the root-selection policy. `None` means no forward solution.
fn select_root(first: Point, second: Point, destination: Point) -> Option<Point> {
    match (first.x >= 0.0, second.x >= 0.0) {
        (false, false) => return None,
        (true, false) => return Some(first),
        (false, true) => return Some(second),
        (true, true) => {}
    }

    match (first.y >= 0.0, second.y >= 0.0) {
        (true, false) => return Some(first),
        (false, true) => return Some(second),
        _ => {}
    }

    if second.manhattan(destination) < first.manhattan(destination) {
        Some(second)
    } else {
        Some(first)
    }
}

/// Pull `value` back to `destination` if it went past it, moving from `start`.
#[inline]
fn clamp_axis(start: f64, destination: f64, value: f64) -> f64 {
    if destination >= start {
        value.min(destination)
    } else {
        value.max(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn to(start: Point, dest: Point, distance: f64, clamp: bool) -> Point {
        resolve_next_position(start, Target::Point(dest), distance, clamp).unwrap()
    }

    #[test]
    fn test_vertical_line() {
        let p = to(Point::new(5.0, 5.0), Point::new(5.0, 10.0), 3.0, false);
        assert_eq!(p, Point::new(5.0, 8.0));

        // Moving up the screen
        let p = to(Point::new(5.0, 5.0), Point::new(5.0, 0.0), 2.0, false);
        assert_eq!(p, Point::new(5.0, 3.0));
    }

    #[test]
    fn test_vertical_line_clamps_to_destination() {
        let p = to(Point::new(5.0, 5.0), Point::new(5.0, 10.0), 10.0, true);
        assert_eq!(p, Point::new(5.0, 10.0));

        // Without clamp the destination is overshot
        let p = to(Point::new(5.0, 5.0), Point::new(5.0, 10.0), 10.0, false);
        assert_eq!(p, Point::new(5.0, 15.0));
    }

    #[test]
    fn test_sub_epsilon_offset_counts_as_arrived() {
        let start = Point::new(5.0, 5.0);
        let dest = Point::new(5.0 + 1e-12, 5.0);
        assert_eq!(to(start, dest, 3.0, false), dest);
        assert_eq!(to(start, dest, 3.0, true), dest);
    }

    #[test]
    fn test_horizontal_line() {
        let p = to(Point::new(1.0, 4.0), Point::new(10.0, 4.0), 5.0, false);
        assert!((p.x - 6.0).abs() < EPS);
        assert!((p.y - 4.0).abs() < EPS);
    }

    #[test]
    fn test_diagonal_line_exact_distance() {
        // 3-4-5 triangle
        let start = Point::new(10.0, 10.0);
        let p = to(start, Point::new(40.0, 50.0), 5.0, false);
        assert!((p.x - 13.0).abs() < EPS);
        assert!((p.y - 14.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_stops_at_destination() {
        let start = Point::new(10.0, 10.0);
        let dest = Point::new(13.0, 14.0);
        let p = to(start, dest, 50.0, true);
        assert!((p.x - dest.x).abs() < EPS);
        assert!((p.y - dest.y).abs() < EPS);
    }

    #[test]
    fn test_negative_x_root_discarded() {
        // Backward root lands at x = -4, forward at x = 6
        let p = to(Point::new(1.0, 0.0), Point::new(10.0, 0.0), 5.0, false);
        assert!((p.x - 6.0).abs() < EPS);

        // Destination behind start: the only non-negative root is still picked
        let p = to(Point::new(1.0, 0.0), Point::new(-10.0, 0.0), 5.0, false);
        assert!((p.x - 6.0).abs() < EPS);
    }

    #[test]
    fn test_negative_y_root_discarded() {
        // Both roots have x >= 0; the root above the screen is rejected even
        // though it is the one toward the destination.
        let start = Point::new(10.0, 1.0);
        let dest = Point::new(11.0, -9.0);
        let p = to(start, dest, 2.0, false);
        assert!(p.y >= 0.0);
        assert!((p.distance(start) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_both_roots_negative_is_no_solution() {
        let start = Point::new(-20.0, 5.0);
        let result = resolve_next_position(start, Target::Point(Point::new(-30.0, 5.0)), 3.0, false);
        assert!(matches!(result, Err(GeometryError::NoSolution { .. })));
    }

    #[test]
    fn test_invalid_distance() {
        let start = Point::new(1.0, 1.0);
        let target = Target::Point(Point::new(5.0, 5.0));
        assert_eq!(
            resolve_next_position(start, target, -1.0, false),
            Err(GeometryError::InvalidDistance(-1.0))
        );
        assert!(resolve_next_position(start, target, f64::NAN, false).is_err());
    }

    #[test]
    fn test_zero_distance_and_same_point() {
        let start = Point::new(3.0, 4.0);
        assert_eq!(to(start, Point::new(9.0, 9.0), 0.0, false), start);
        assert_eq!(to(start, start, 5.0, true), start);
    }

    #[test]
    fn test_direction_target() {
        let start = Point::new(100.0, 100.0);
        let p = resolve_next_position(start, Target::Direction(Direction::NorthEast), 10.0, true)
            .unwrap();
        assert!((p.x - 107.0711).abs() < 1e-4);
        assert!((p.y - 92.9289).abs() < 1e-4);
    }

    #[test]
    fn test_motion_request() {
        let request = MotionRequest {
            start: Point::new(5.0, 5.0),
            target: Target::Point(Point::new(5.0, 10.0)),
            distance: 3.0,
            clamp_to_destination: false,
        };
        assert_eq!(request.resolve(), Ok(Point::new(5.0, 8.0)));
    }

    proptest! {
        #[test]
        fn prop_travels_exact_distance(
            sx in 0.0f64..500.0,
            sy in 0.0f64..500.0,
            dx in 1.0f64..300.0,
            dy in -300.0f64..300.0,
            flip in any::<bool>(),
            distance in 0.5f64..100.0,
        ) {
            let start = Point::new(sx, sy);
            let dest = Point::new(if flip { sx - dx } else { sx + dx }, sy + dy);
            let result = resolve_next_position(start, Target::Point(dest), distance, false);
            let p = result.unwrap();
            prop_assert!((p.distance(start) - distance).abs() < 1e-6 * distance.max(1.0));
        }
    }
}
