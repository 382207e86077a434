//! 8-Way Direction Model
//!
//! Maps directions to per-axis displacements and back.
//!
//! ## Diagonal Correction
//!
//! A diagonal step of `distance` moves `distance / √2` on each axis, so the
//! Euclidean displacement equals `distance` rather than `distance · √2`.
//!
//! ```text
//!        NW   N   NE
//!          \  |  /
//!      W  ---  ---  E        (+Y points down the screen)
//!          /  |  \
//!        SW   S   SE
//! ```

use serde::{Serialize, Deserialize};

use super::point::Point;

/// tan(22.5°): octant boundary used when snapping a vector to a direction.
const TAN_PI_8: f64 = std::f64::consts::SQRT_2 - 1.0;

/// One of the eight compass directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Up the screen (-Y)
    North = 0,
    /// Up and right
    NorthEast = 1,
    /// Right (+X)
    East = 2,
    /// Down and right
    SouthEast = 3,
    /// Down the screen (+Y)
    South = 4,
    /// Down and left
    SouthWest = 5,
    /// Left (-X)
    West = 6,
    /// Up and left
    NorthWest = 7,
}

impl Direction {
    /// All directions, clockwise from North.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit signs of this direction on each axis.
    #[inline]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Direction::North => (0.0, -1.0),
            Direction::NorthEast => (1.0, -1.0),
            Direction::East => (1.0, 0.0),
            Direction::SouthEast => (1.0, 1.0),
            Direction::South => (0.0, 1.0),
            Direction::SouthWest => (-1.0, 1.0),
            Direction::West => (-1.0, 0.0),
            Direction::NorthWest => (-1.0, -1.0),
        }
    }

    /// True for the four diagonal directions.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        (self as u8) % 2 == 1
    }

    /// Direction pointing the other way.
    #[inline]
    pub fn opposite(self) -> Direction {
        Self::ALL[((self as usize) + 4) % 8]
    }

    /// Per-axis displacement for moving `distance` in this direction.
    ///
    /// Diagonals are scaled by 1/√2 on each axis.
    pub fn delta(self, distance: f64) -> (f64, f64) {
        let (sx, sy) = self.signs();
        let per_axis = if self.is_diagonal() {
            distance * std::f64::consts::FRAC_1_SQRT_2
        } else {
            distance
        };
        (sx * per_axis, sy * per_axis)
    }

    /// Compose a direction from held axis inputs.
    ///
    /// Only the sign of each axis matters. Returns `None` when both are zero.
    pub fn from_axes(x: i32, y: i32) -> Option<Direction> {
        match (x.signum(), y.signum()) {
            (0, -1) => Some(Direction::North),
            (1, -1) => Some(Direction::NorthEast),
            (1, 0) => Some(Direction::East),
            (1, 1) => Some(Direction::SouthEast),
            (0, 1) => Some(Direction::South),
            (-1, 1) => Some(Direction::SouthWest),
            (-1, 0) => Some(Direction::West),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }

    /// Nearest direction for travel from `from` to `to`.
    ///
    /// Returns `None` when the points coincide. Equal |dx| and |dy| always
    /// yield the diagonal; octant boundaries (exactly 22.5° off an axis)
    /// resolve to the orthogonal direction.
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        if dy.abs() <= dx.abs() * TAN_PI_8 {
            return Some(if dx > 0.0 { Direction::East } else { Direction::West });
        }
        if dx.abs() <= dy.abs() * TAN_PI_8 {
            return Some(if dy > 0.0 { Direction::South } else { Direction::North });
        }

        let x = if dx > 0.0 { 1 } else { -1 };
        let y = if dy > 0.0 { 1 } else { -1 };
        Self::from_axes(x, y)
    }
}

/// Direct accessor for an entity's current facing.
pub trait Facing {
    /// Direction the entity currently faces, if any.
    fn facing(&self) -> Option<Direction>;
}
