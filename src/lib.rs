//! # Screenwalk
//!
//! Movement and timing core for a screen-based 2D action game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SCREENWALK                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Stateless primitives                      │
//! │  ├── point.rs    - 2D points                                 │
//! │  ├── rect.rs     - Axis-aligned rectangles                   │
//! │  ├── direction.rs- Eight-way compass directions              │
//! │  ├── geometry.rs - Next-position solver                      │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── elapser.rs  - Timer registry                            │
//! │  ├── overlap.rs  - Overlap resolution                        │
//! │  ├── entity.rs   - Entities and session state                │
//! │  ├── behavior.rs - Cooldowns, fuses, traps, animation        │
//! │  ├── tick.rs     - Per-frame driver                          │
//! │  └── snapshot.rs - Render snapshots                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The simulation never reads the wall clock; time only enters through the
//! elapsed milliseconds handed to [`game::tick::tick`]. Entities and timers
//! live in BTreeMaps, so they are visited in handle order. Given the same
//! starting session and the same recorded frames, a replay produces the same
//! state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default host frame rate (Hz)
pub const DEFAULT_TICK_RATE: u32 = 60;

// Re-exports for convenience
pub use crate::core::{Direction, Point, Rect};
pub use crate::game::{Session, SimConfig, TickResult};
