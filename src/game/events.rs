//! Tick Events
//!
//! Everything notable that happened during a tick, for the host to render,
//! play sounds for, or log.

use serde::{Serialize, Deserialize};

use crate::core::direction::Direction;
use crate::core::point::Point;
use crate::core::rect::Rect;
use crate::game::elapser::TimerEvent;
use crate::game::entity::EntityId;

/// Processing order within a tick.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Movement and collisions
    Movement = 0,
    /// Attacks and damage
    Combat = 1,
    /// Timer-driven state changes
    Timed = 2,
    /// Entities leaving the session
    Lifecycle = 3,
}

/// What blocked a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocker {
    /// Static obstacle, by index in the screen's obstacle list
    Obstacle(usize),
    /// Another solid entity
    Entity(EntityId),
    /// Edge of the screen
    ScreenEdge,
}

/// Tick event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TickEventData {
    /// Entity's move was corrected to avoid overlap
    Collided {
        /// Entity that moved
        entity: EntityId,
        /// Footprint it tried to move to
        attempted: Rect,
        /// Footprint it ended up at
        resolved: Rect,
        /// What was in the way
        blockers: Vec<Blocker>,
    },

    /// Entity stayed put because its move could not be computed or placed
    MovementSkipped {
        /// Entity that stayed put
        entity: EntityId,
        /// Error that stopped the move
        reason: String,
    },

    /// Entity arrived at its destination
    DestinationReached {
        /// Entity that arrived
        entity: EntityId,
        /// Where it arrived
        position: Point,
    },

    /// Entity attacked
    AttackPerformed {
        /// Attacker
        entity: EntityId,
        /// Direction of the attack
        facing: Option<Direction>,
    },

    /// Entity took contact damage
    Damaged {
        /// Entity that was hurt
        entity: EntityId,
        /// Entity it touched
        source: EntityId,
        /// Health left
        health: u32,
    },

    /// Timer completed a period
    TimerElapsed(TimerEvent),

    /// Fuse ran out
    FuseDetonated {
        /// Bomb that went off (already despawned)
        entity: EntityId,
        /// Center of the blast
        center: Point,
    },

    /// Temporary object timed out
    Expired {
        /// Entity that was removed
        entity: EntityId,
    },

    /// Trap switched on or off
    TrapToggled {
        /// Trap
        entity: EntityId,
        /// New state
        active: bool,
    },

    /// Entity ran out of health
    Defeated {
        /// Entity that was removed
        entity: EntityId,
    },
}

/// A tick event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TickEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Processing priority
    pub priority: EventPriority,

    /// Entity involved (for tie-breaking)
    pub entity: Option<EntityId>,

    /// Event data
    pub data: TickEventData,
}

impl TickEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: TickEventData) -> Self {
        let entity = match &data {
            TickEventData::Collided { entity, .. }
            | TickEventData::MovementSkipped { entity, .. }
            | TickEventData::DestinationReached { entity, .. }
            | TickEventData::AttackPerformed { entity, .. }
            | TickEventData::Damaged { entity, .. }
            | TickEventData::FuseDetonated { entity, .. }
            | TickEventData::Expired { entity }
            | TickEventData::TrapToggled { entity, .. }
            | TickEventData::Defeated { entity } => Some(*entity),
            TickEventData::TimerElapsed(timer) => Some(timer.key.owner),
        };

        Self {
            tick,
            priority,
            entity,
            data,
        }
    }

    /// Create collided event.
    pub fn collided(
        tick: u64,
        entity: EntityId,
        attempted: Rect,
        resolved: Rect,
        blockers: Vec<Blocker>,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Movement,
            TickEventData::Collided {
                entity,
                attempted,
                resolved,
                blockers,
            },
        )
    }

    /// Create movement skipped event.
    pub fn movement_skipped(tick: u64, entity: EntityId, reason: impl Into<String>) -> Self {
        Self::new(
            tick,
            EventPriority::Movement,
            TickEventData::MovementSkipped {
                entity,
                reason: reason.into(),
            },
        )
    }

    /// Create destination reached event.
    pub fn destination_reached(tick: u64, entity: EntityId, position: Point) -> Self {
        Self::new(
            tick,
            EventPriority::Movement,
            TickEventData::DestinationReached { entity, position },
        )
    }

    /// Create attack performed event.
    pub fn attack_performed(tick: u64, entity: EntityId, facing: Option<Direction>) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            TickEventData::AttackPerformed { entity, facing },
        )
    }

    /// Create damaged event.
    pub fn damaged(tick: u64, entity: EntityId, source: EntityId, health: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            TickEventData::Damaged {
                entity,
                source,
                health,
            },
        )
    }

    /// Create timer elapsed event.
    pub fn timer_elapsed(tick: u64, timer: TimerEvent) -> Self {
        Self::new(tick, EventPriority::Timed, TickEventData::TimerElapsed(timer))
    }

    /// Create fuse detonated event.
    pub fn fuse_detonated(tick: u64, entity: EntityId, center: Point) -> Self {
        Self::new(
            tick,
            EventPriority::Timed,
            TickEventData::FuseDetonated { entity, center },
        )
    }

    /// Create trap toggled event.
    pub fn trap_toggled(tick: u64, entity: EntityId, active: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Timed,
            TickEventData::TrapToggled { entity, active },
        )
    }

    /// Create expired event.
    pub fn expired(tick: u64, entity: EntityId) -> Self {
        Self::new(tick, EventPriority::Lifecycle, TickEventData::Expired { entity })
    }

    /// Create defeated event.
    pub fn defeated(tick: u64, entity: EntityId) -> Self {
        Self::new(tick, EventPriority::Lifecycle, TickEventData::Defeated { entity })
    }
}

impl PartialEq for TickEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.entity == other.entity
    }
}

impl Eq for TickEvent {}

impl PartialOrd for TickEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TickEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then entity
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.entity.cmp(&other.entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let id1 = EntityId::new(1);
        let id2 = EntityId::new(2);

        let event1 = TickEvent::movement_skipped(10, id1, "blocked");
        let event2 = TickEvent::attack_performed(10, id1, None);
        let event3 = TickEvent::movement_skipped(10, id2, "blocked");

        // Same tick, but movement < combat
        assert!(event1 < event2);

        // Same tick and priority, but id1 < id2
        assert!(event1 < event3);
    }

    #[test]
    fn test_event_entity_extracted() {
        let id = EntityId::new(4);
        assert_eq!(TickEvent::expired(1, id).entity, Some(id));
        assert_eq!(TickEvent::damaged(1, id, EntityId::new(9), 2).entity, Some(id));
    }
}
