//! Frozen Per-Entity Intents
//!
//! The host samples keyboards, pads and AI once per frame and hands the tick
//! one `Intent` per entity. The core never reads live input.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::direction::Direction;
use crate::core::point::Point;
use crate::game::entity::EntityId;

/// Intents for one tick, keyed by entity (sorted for deterministic order).
pub type Intents = BTreeMap<EntityId, Intent>;

/// What one entity wants to do this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Horizontal axis: negative = left, positive = right, 0 = none
    pub move_x: i8,

    /// Vertical axis: negative = up, positive = down, 0 = none
    pub move_y: i8,

    /// Point to walk toward (used when no axis is held)
    pub destination: Option<Point>,

    /// Action flags (packed bits):
    /// - Bit 0: Attack pressed this frame
    /// - Bit 1-7: Reserved
    pub flags: u8,
}

impl Intent {
    /// Attack flag bit
    pub const FLAG_ATTACK: u8 = 0x01;

    /// Idle intent.
    pub const fn new() -> Self {
        Self {
            move_x: 0,
            move_y: 0,
            destination: None,
            flags: 0,
        }
    }

    /// Intent holding axis input.
    pub const fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            destination: None,
            flags: 0,
        }
    }

    /// Intent to move one way.
    pub fn toward(direction: Direction) -> Self {
        let (sx, sy) = direction.signs();
        Self::with_movement(sx as i8, sy as i8)
    }

    /// Intent to walk toward a point.
    pub fn walk_to(destination: Point) -> Self {
        Self {
            destination: Some(destination),
            ..Self::new()
        }
    }

    /// Direction composed from the held axes.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_axes(self.move_x as i32, self.move_y as i32)
    }

    /// Check if attack was pressed this frame.
    #[inline]
    pub fn attack_pressed(&self) -> bool {
        self.flags & Self::FLAG_ATTACK != 0
    }

    /// Check if this intent asks for anything at all.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.direction().is_none() && self.destination.is_none() && self.flags == 0
    }

    /// Set attack flag.
    #[inline]
    pub fn set_attack(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_ATTACK;
        } else {
            self.flags &= !Self::FLAG_ATTACK;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_direction() {
        assert_eq!(Intent::new().direction(), None);
        assert_eq!(Intent::with_movement(1, -1).direction(), Some(Direction::NorthEast));
        assert_eq!(Intent::with_movement(-100, 0).direction(), Some(Direction::West));

        for dir in Direction::ALL {
            assert_eq!(Intent::toward(dir).direction(), Some(dir));
        }
    }

    #[test]
    fn test_intent_flags() {
        let mut intent = Intent::new();
        assert!(intent.is_idle());

        intent.set_attack(true);
        assert!(intent.attack_pressed());
        assert_eq!(intent.flags, Intent::FLAG_ATTACK);
        assert!(!intent.is_idle());

        intent.set_attack(false);
        assert!(!intent.attack_pressed());
        assert_eq!(intent.flags, 0);
        assert!(intent.is_idle());
    }

    #[test]
    fn test_walk_to_is_not_idle() {
        let intent = Intent::walk_to(Point::new(3.0, 4.0));
        assert_eq!(intent.direction(), None);
        assert!(!intent.is_idle());
    }
}
