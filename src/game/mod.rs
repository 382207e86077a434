//! Game Logic Module
//!
//! Everything that runs inside a tick. Deterministic for identical inputs.
//!
//! ## Module Structure
//!
//! - `elapser`: Timer registry keyed by entity and use case
//! - `overlap`: Overlap detection and minimal-push resolution
//! - `entity`: Entities and the session that owns them
//! - `screen`: Screen bounds and static obstacles
//! - `input`: Per-entity intents for a tick
//! - `behavior`: Cooldowns, fuses, traps and animation on top of timers
//! - `tick`: The per-frame driver
//! - `events`: Tick events for the host
//! - `snapshot`: Render snapshots
//! - `config`: Simulation tunables

pub mod elapser;
pub mod overlap;
pub mod entity;
pub mod screen;
pub mod input;
pub mod behavior;
pub mod tick;
pub mod events;
pub mod snapshot;
pub mod config;

// Re-export key types
pub use elapser::{Elapser, Timer, TimerEvent, TimerKey, UseCase};
pub use overlap::{resolve_overlap, OverlapResolutionError};
pub use entity::{Entity, EntityId, EntityKind, Session, SessionError};
pub use screen::{Screen, ScreenLayout};
pub use input::{Intent, Intents};
pub use tick::{replay, tick, RecordedFrame, TickResult};
pub use events::{TickEvent, TickEventData};
pub use snapshot::Snapshot;
pub use config::{ConfigError, SimConfig};
