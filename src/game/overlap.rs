//! Overlap Detection and Resolution
//!
//! Keeps moving rectangles out of obstacles.
//!
//! ## Resolution
//!
//! Each pass walks the obstacles in order. For every obstacle the candidate
//! still overlaps, it is pushed out along the axis needing the smaller
//! correction. After the pass the whole set is re-tested. Pushing out of one
//! obstacle can push into another, and a rectangle squeezed into a gap
//! narrower than itself oscillates forever, so the number of passes is capped.
//!
//! ## Tie-breaks
//!
//! - equal X and Y correction: push along X
//! - equal correction to either side of an axis: push toward negative
//!   (left / up)

use thiserror::Error;

use crate::core::rect::Rect;

/// Pass cap used when the caller has no configured value.
pub const DEFAULT_MAX_RESOLVE_ITERATIONS: u32 = 8;

/// Penetration at or below this depth counts as touching.
pub const OVERLAP_EPSILON: f64 = 1e-9;

/// Overlap resolution failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlapResolutionError {
    /// Still overlapping after the pass cap.
    #[error("overlap unresolved after {iterations} passes for {entity:?} against {} obstacles", .obstacles.len())]
    UnresolvedAfterMaxIterations {
        /// Rectangle that could not be placed (as submitted)
        entity: Rect,
        /// Full obstacle set, in resolution order
        obstacles: Vec<Rect>,
        /// Passes attempted
        iterations: u32,
    },
}

/// Check if two rectangles overlap.
///
/// Rectangles sharing only an edge or corner do not overlap.
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() - OVERLAP_EPSILON
        && b.left() < a.right() - OVERLAP_EPSILON
        && a.top() < b.bottom() - OVERLAP_EPSILON
        && b.top() < a.bottom() - OVERLAP_EPSILON
}

/// Check if two rectangles overlap or share an edge.
#[inline]
pub fn rects_touch(a: &Rect, b: &Rect) -> bool {
    a.left() <= b.right() + OVERLAP_EPSILON
        && b.left() <= a.right() + OVERLAP_EPSILON
        && a.top() <= b.bottom() + OVERLAP_EPSILON
        && b.top() <= a.bottom() + OVERLAP_EPSILON
}

/// Indices of every obstacle `rect` overlaps, in order.
pub fn overlapping_indices(rect: &Rect, obstacles: &[Rect]) -> Vec<usize> {
    obstacles
        .iter()
        .enumerate()
        .filter(|(_, obstacle)| rects_overlap(rect, obstacle))
        .map(|(i, _)| i)
        .collect()
}

/// Smallest single-axis offset that moves `moving` clear of `obstacle`.
pub fn minimal_push(moving: &Rect, obstacle: &Rect) -> (f64, f64) {
    // Negative corrections move left/up, positive right/down
    let to_left = obstacle.left() - moving.right();
    let to_right = obstacle.right() - moving.left();
    let to_top = obstacle.top() - moving.bottom();
    let to_bottom = obstacle.bottom() - moving.top();

    let dx = if to_right < -to_left { to_right } else { to_left };
    let dy = if to_bottom < -to_top { to_bottom } else { to_top };

    if dy.abs() < dx.abs() {
        (0.0, dy)
    } else {
        (dx, 0.0)
    }
}

/// Move `candidate` out of every obstacle.
///
/// Non-overlapping candidates are returned unchanged. The result is fully
/// determined by the candidate and the obstacle order.
pub fn resolve_overlap(
    candidate: Rect,
    obstacles: &[Rect],
    max_iterations: u32,
) -> Result<Rect, OverlapResolutionError> {
    let mut current = candidate;

    for _ in 0..max_iterations {
        if !obstacles.iter().any(|o| rects_overlap(&current, o)) {
            return Ok(current);
        }

        for obstacle in obstacles {
            if rects_overlap(&current, obstacle) {
                let (dx, dy) = minimal_push(&current, obstacle);
                current = current.translated(dx, dy);
            }
        }
    }

    if obstacles.iter().any(|o| rects_overlap(&current, o)) {
        return Err(OverlapResolutionError::UnresolvedAfterMaxIterations {
            entity: candidate,
            obstacles: obstacles.to_vec(),
            iterations: max_iterations,
        });
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::Point;

    #[test]
    fn test_rects_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);

        assert!(rects_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(rects_overlap(&a, &Rect::new(2.0, 2.0, 2.0, 2.0)));

        // Edge touching is not overlap
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &right));
        assert!(rects_touch(&a, &right));

        // Far away
        let far = Rect::new(50.0, 50.0, 1.0, 1.0);
        assert!(!rects_overlap(&a, &far));
        assert!(!rects_touch(&a, &far));
    }

    #[test]
    fn test_non_overlapping_is_unchanged() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let obstacles = [Rect::new(10.0, 0.0, 5.0, 5.0), Rect::new(-20.0, -20.0, 5.0, 5.0)];
        let resolved = resolve_overlap(candidate, &obstacles, DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved, candidate);

        let resolved = resolve_overlap(candidate, &[], DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved, candidate);
    }

    #[test]
    fn test_single_obstacle_pushes_along_shorter_axis() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let wall = Rect::new(8.0, -20.0, 20.0, 50.0);

        let resolved = resolve_overlap(candidate, &[wall], DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved.origin, Point::new(-2.0, 0.0));
        assert!(!rects_overlap(&resolved, &wall));
        assert!(rects_touch(&resolved, &wall));
    }

    #[test]
    fn test_vertical_push() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let floor = Rect::new(-50.0, 7.0, 200.0, 20.0);

        let resolved = resolve_overlap(candidate, &[floor], DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved.origin, Point::new(0.0, -3.0));
    }

    #[test]
    fn test_equal_axes_prefer_x() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let corner = Rect::new(8.0, 8.0, 10.0, 10.0);

        assert_eq!(minimal_push(&candidate, &corner), (-2.0, 0.0));
        let resolved = resolve_overlap(candidate, &[corner], DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved.origin, Point::new(-2.0, 0.0));
    }

    #[test]
    fn test_equal_sides_prefer_negative() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Centered pillar: 8 to the left or 8 to the right
        let pillar = Rect::new(2.0, -50.0, 6.0, 200.0);
        assert_eq!(minimal_push(&candidate, &pillar), (-8.0, 0.0));

        // Centered beam: 8 up or 8 down
        let beam = Rect::new(-50.0, 2.0, 200.0, 6.0);
        assert_eq!(minimal_push(&candidate, &beam), (0.0, -8.0));
    }

    #[test]
    fn test_two_obstacles_converge() {
        // Entity wedged into the corner of a floor and a wall
        let candidate = Rect::new(0.0, 5.0, 10.0, 10.0);
        let floor = Rect::new(-50.0, 12.0, 200.0, 20.0);
        let wall = Rect::new(9.0, -50.0, 20.0, 100.0);

        let resolved =
            resolve_overlap(candidate, &[floor, wall], DEFAULT_MAX_RESOLVE_ITERATIONS).unwrap();
        assert_eq!(resolved.origin, Point::new(-1.0, 2.0));
        assert!(overlapping_indices(&resolved, &[floor, wall]).is_empty());
    }

    #[test]
    fn test_sandwich_fails_instead_of_looping() {
        // Gap between the pillars (2..8) is narrower than the entity (10)
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let left = Rect::new(-4.0, -50.0, 6.0, 110.0);
        let right = Rect::new(8.0, -50.0, 6.0, 110.0);
        let obstacles = [left, right];

        let result = resolve_overlap(candidate, &obstacles, DEFAULT_MAX_RESOLVE_ITERATIONS);
        match result {
            Err(OverlapResolutionError::UnresolvedAfterMaxIterations { entity, obstacles: seen, iterations }) => {
                assert_eq!(entity, candidate);
                assert_eq!(seen, obstacles.to_vec());
                assert_eq!(iterations, DEFAULT_MAX_RESOLVE_ITERATIONS);
            }
            other => panic!("expected unresolved overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let candidate = Rect::new(3.0, 4.0, 12.0, 9.0);
        let obstacles = [
            Rect::new(0.0, 10.0, 30.0, 5.0),
            Rect::new(12.0, 0.0, 5.0, 30.0),
            Rect::new(-5.0, -5.0, 9.0, 9.0),
        ];

        let first = resolve_overlap(candidate, &obstacles, DEFAULT_MAX_RESOLVE_ITERATIONS);
        for _ in 0..100 {
            assert_eq!(resolve_overlap(candidate, &obstacles, DEFAULT_MAX_RESOLVE_ITERATIONS), first);
        }
    }

    #[test]
    fn test_zero_iteration_cap() {
        let candidate = Rect::new(0.0, 0.0, 10.0, 10.0);
        let wall = Rect::new(8.0, 0.0, 10.0, 10.0);
        assert!(resolve_overlap(candidate, &[wall], 0).is_err());
        assert_eq!(resolve_overlap(candidate, &[], 0), Ok(candidate));
    }
}
