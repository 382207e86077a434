//! Entities and Session State
//!
//! A [`Session`] owns everything one simulation instance needs: the screen,
//! the entities on it and the timer registry. Sessions share nothing, so
//! several can run side by side (tests, previews).
//!
//! Entities are addressed by opaque [`EntityId`] handles. Uses BTreeMap for
//! deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::direction::{Direction, Facing};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::point::Point;
use crate::core::rect::Rect;
use crate::game::behavior;
use crate::game::elapser::Elapser;
use crate::game::events::TickEvent;
use crate::game::screen::Screen;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Opaque entity handle.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create from a raw handle.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// Broad entity category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Player-controlled hero
    Player = 0,
    /// AI-controlled monster; hurts players on contact
    Enemy = 1,
    /// Thrown or fired object
    Projectile = 2,
    /// Temporary collectible
    Pickup = 3,
    /// Explodes when its fuse runs out
    Bomb = 4,
    /// Stationary hazard that switches on and off
    Trap = 5,
}

/// A rectangle that lives on the screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Handle
    pub id: EntityId,

    /// Category
    pub kind: EntityKind,

    /// Current footprint
    pub rect: Rect,

    /// Movement speed (pixels per second)
    pub speed: f64,

    /// Direction last moved in
    pub facing: Option<Direction>,

    /// Standing destination (AI walk targets, homing projectiles)
    pub destination: Option<Point>,

    /// Step-walkers move one fixed step every interval instead of every tick
    pub step_interval_ms: Option<u64>,

    /// Blocks, and is blocked by, other solid entities
    pub solid: bool,

    /// Hurts players on contact
    pub hostile: bool,

    /// Traps only hurt while active
    pub active: bool,

    /// Remaining health
    pub health: u32,

    /// Walk-cycle frame for rendering
    pub animation_frame: u32,
}

impl Entity {
    /// Create an entity with defaults for its kind.
    pub fn new(id: EntityId, kind: EntityKind, rect: Rect, speed: f64) -> Self {
        let (solid, hostile, health) = match kind {
            EntityKind::Player => (true, false, 3),
            EntityKind::Enemy => (true, true, 2),
            EntityKind::Projectile | EntityKind::Pickup | EntityKind::Bomb => (false, false, 1),
            EntityKind::Trap => (false, true, 1),
        };

        Self {
            id,
            kind,
            rect,
            speed,
            facing: None,
            destination: None,
            step_interval_ms: None,
            solid,
            hostile,
            active: true,
            health,
            animation_frame: 0,
        }
    }

    /// Current top-left position.
    #[inline]
    pub fn position(&self) -> Point {
        self.rect.origin
    }

    /// Whether this entity can hurt others right now.
    #[inline]
    pub fn is_dangerous(&self) -> bool {
        self.hostile && self.active
    }
}

impl Facing for Entity {
    fn facing(&self) -> Option<Direction> {
        self.facing
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Handle already in use.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// Handle not in the session.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// Complete state of one simulation instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Ticks simulated so far
    pub tick: u64,

    /// Screen being played
    pub screen: Screen,

    /// All entities (BTreeMap for deterministic iteration)
    pub entities: BTreeMap<EntityId, Entity>,

    /// Timer registry, the session's only clock
    pub timers: Elapser,

    /// Next handle to hand out
    next_id: u32,

    /// Elapsed time not yet simulated (below the minimum tick delay)
    pub(crate) pending_ms: u64,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pending_events: Vec<TickEvent>,
}

impl Session {
    /// Create an empty session on a screen.
    pub fn new(screen: Screen) -> Self {
        Self {
            tick: 0,
            screen,
            entities: BTreeMap::new(),
            timers: Elapser::new(),
            next_id: 1,
            pending_ms: 0,
            pending_events: Vec::new(),
        }
    }

    /// Current simulated time.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Add an entity with a fresh handle.
    pub fn spawn(&mut self, kind: EntityKind, rect: Rect, speed: f64) -> EntityId {
        while self.entities.contains_key(&EntityId(self.next_id)) {
            self.next_id += 1;
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;

        self.entities.insert(id, Entity::new(id, kind, rect, speed));
        debug!("Spawned {:?} {} at {}", kind, id, rect.origin);
        id
    }

    /// Add a fully built entity under its own handle.
    pub fn insert(&mut self, entity: Entity) -> Result<(), SessionError> {
        if self.entities.contains_key(&entity.id) {
            return Err(SessionError::DuplicateEntity(entity.id));
        }
        self.next_id = self.next_id.max(entity.id.0.saturating_add(1));
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    /// Spawn a pickup that disappears after `lifetime_ms`.
    pub fn spawn_pickup(&mut self, rect: Rect, lifetime_ms: u64) -> EntityId {
        let id = self.spawn(EntityKind::Pickup, rect, 0.0);
        behavior::set_lifetime(&mut self.timers, id, lifetime_ms);
        id
    }

    /// Spawn a bomb that detonates after `fuse_ms`.
    pub fn spawn_bomb(&mut self, rect: Rect, fuse_ms: u64) -> EntityId {
        let id = self.spawn(EntityKind::Bomb, rect, 0.0);
        behavior::arm_fuse(&mut self.timers, id, fuse_ms);
        id
    }

    /// Spawn a trap that flips on and off every `period_ms`.
    pub fn spawn_trap(&mut self, rect: Rect, period_ms: u64) -> EntityId {
        let id = self.spawn(EntityKind::Trap, rect, 0.0);
        behavior::start_trap_cycle(&mut self.timers, id, period_ms);
        id
    }

    /// Remove an entity and every timer it owns.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity, SessionError> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(SessionError::UnknownEntity(id))?;
        self.timers.clear_owner(id);
        debug!("Despawned {:?} {}", entity.kind, id);
        Ok(entity)
    }

    /// Get an entity.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Obstacles that block `id`, plus which entity (if any) each came from.
    ///
    /// Static obstacles come first in screen order, then other solid
    /// entities in handle order. Non-solid entities only see static obstacles.
    pub fn obstacles_for(&self, id: EntityId) -> (Vec<Rect>, Vec<Option<EntityId>>) {
        let mut rects = self.screen.obstacles.clone();
        let mut owners = vec![None; rects.len()];

        let solid = self.entities.get(&id).map(|e| e.solid).unwrap_or(false);
        if solid {
            for (other_id, other) in &self.entities {
                if *other_id != id && other.solid {
                    rects.push(other.rect);
                    owners.push(Some(*other_id));
                }
            }
        }

        (rects, owners)
    }

    /// Queue an event for this tick.
    pub fn push_event(&mut self, event: TickEvent) {
        self.pending_events.push(event);
    }

    /// Drain this tick's events.
    pub fn take_events(&mut self) -> Vec<TickEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Hash the session for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.now_ms(), |hasher| {
            hasher.update_u32(self.entities.len() as u32);
            for (id, entity) in &self.entities {
                hasher.update_u32(id.0);
                hasher.update_u8(entity.kind as u8);
                hasher.update_rect(&entity.rect);
                hasher.update_u8(entity.facing.map(|d| d as u8 + 1).unwrap_or(0));
                hasher.update_bool(entity.active);
                hasher.update_u32(entity.health);
                hasher.update_u32(entity.animation_frame);
            }
            hasher.update_u32(self.timers.len() as u32);
        })
    }
}
