//! Render Snapshots
//!
//! Immutable copy of what the renderer needs after a tick. Handed across the
//! tick boundary so drawing never touches live session state.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::direction::Direction;
use crate::core::rect::Rect;
use crate::game::behavior;
use crate::game::entity::{EntityId, EntityKind, Session};

/// Snapshot encoding errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Binary encoding failed.
    #[error("binary snapshot error: {0}")]
    Binary(#[from] bincode::Error),

    /// JSON encoding failed.
    #[error("json snapshot error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entity as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Handle
    pub id: EntityId,
    /// Category (brush selection)
    pub kind: EntityKind,
    /// Footprint
    pub rect: Rect,
    /// Sprite facing
    pub facing: Option<Direction>,
    /// Walk-cycle frame
    pub frame: u32,
    /// Remaining health
    pub health: u32,
    /// Drawn blinking while invulnerable
    pub invulnerable: bool,
    /// Trap state
    pub active: bool,
}

/// Frozen session state at the end of a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick number
    pub tick: u64,
    /// Simulated time
    pub now_ms: u64,
    /// Entities in handle order
    pub entities: Vec<EntitySnapshot>,
}

impl Snapshot {
    /// Capture the current session state.
    pub fn capture(session: &Session) -> Self {
        let entities = session
            .entities
            .values()
            .map(|e| EntitySnapshot {
                id: e.id,
                kind: e.kind,
                rect: e.rect,
                facing: e.facing,
                frame: e.animation_frame,
                health: e.health,
                invulnerable: behavior::is_invulnerable(&session.timers, e.id),
                active: e.active,
            })
            .collect();

        Self {
            tick: session.tick,
            now_ms: session.now_ms(),
            entities,
        }
    }

    /// Find an entity.
    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Serialize to compact binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(data)?)
    }

    /// Serialize to JSON (debug tooling).
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::screen::Screen;

    #[test]
    fn test_capture_and_encode() {
        let mut session = Session::new(Screen::new("test", Rect::new(0.0, 0.0, 320.0, 240.0)));
        let hero = session.spawn(EntityKind::Player, Rect::new(10.0, 20.0, 16.0, 16.0), 60.0);
        behavior::start_invulnerability(&mut session.timers, hero, 500);

        let snapshot = Snapshot::capture(&session);
        let hero_view = snapshot.entity(hero).unwrap();
        assert_eq!(hero_view.rect, Rect::new(10.0, 20.0, 16.0, 16.0));
        assert!(hero_view.invulnerable);

        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"Player\""));
    }

    #[test]
    fn test_decode_rejects_degenerate_rect() {
        let mut session = Session::new(Screen::new("test", Rect::new(0.0, 0.0, 320.0, 240.0)));
        let hero = session.spawn(EntityKind::Player, Rect::new(10.0, 20.0, 16.0, 16.0), 60.0);
        let mut snapshot = Snapshot::capture(&session);
        snapshot.entities[0].rect.width = 0.0;
        assert_eq!(snapshot.entities[0].id, hero);

        let bytes = snapshot.to_bytes().unwrap();
        assert!(matches!(Snapshot::from_bytes(&bytes), Err(SnapshotError::Binary(_))));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = Session::new(Screen::new("test", Rect::new(0.0, 0.0, 320.0, 240.0)));
        let hero = session.spawn(EntityKind::Player, Rect::new(10.0, 20.0, 16.0, 16.0), 60.0);
        let snapshot = Snapshot::capture(&session);

        session.get_mut(hero).unwrap().rect = Rect::new(99.0, 99.0, 16.0, 16.0);
        assert_eq!(snapshot.entity(hero).unwrap().rect.origin.x, 10.0);
    }
}
