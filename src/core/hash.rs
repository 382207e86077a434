//! State Hashing
//!
//! SHA-256 digests of simulation state, used to check that two runs fed the
//! same frames ended in the same place (replays, regression tests).
//!
//! Floats are hashed by bit pattern, so `0.0` and `-0.0` differ.

use sha2::{Sha256, Digest};

use super::point::Point;
use super::rect::Rect;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for session state.
///
/// Order of updates is significant.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for session state.
    pub fn for_session_state() -> Self {
        Self::new(b"SCREENWALK_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f64 (bit pattern, little-endian).
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.hasher.update(value.to_bits().to_le_bytes());
    }

    /// Update with a point.
    #[inline]
    pub fn update_point(&mut self, value: Point) {
        self.update_f64(value.x);
        self.update_f64(value.y);
    }

    /// Update with a rectangle.
    #[inline]
    pub fn update_rect(&mut self, value: &Rect) {
        self.update_point(value.origin);
        self.update_f64(value.width);
        self.update_f64(value.height);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for a session.
///
/// The tick and clock always go first; `add_state` appends the rest.
pub fn compute_state_hash<F>(tick: u64, now_ms: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_session_state();

    hasher.update_u64(tick);
    hasher.update_u64(now_ms);

    add_state(&mut hasher);

    hasher.finalize()
}
