//! Core primitives.
//!
//! Value types and closed-form geometry. Nothing in here holds state
//! between calls.

pub mod point;
pub mod rect;
pub mod direction;
pub mod geometry;
pub mod hash;

// Re-export core types
pub use point::Point;
pub use rect::{Rect, RectError, RectSpec};
pub use direction::{Direction, Facing};
pub use geometry::{resolve_next_position, GeometryError, MotionRequest, Target};
pub use hash::{compute_state_hash, StateHash, StateHasher};
