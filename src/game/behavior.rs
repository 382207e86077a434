//! Timed Behaviors
//!
//! Cooldowns, invulnerability, fuses, lifetimes, trap cycles and animation
//! frames. None of these keep their own clocks; each is a thin rule over a
//! timer in the session's [`Elapser`].

use crate::game::elapser::{Elapser, UseCase};
use crate::game::entity::EntityId;

/// Gate an action behind a cooldown.
///
/// Returns true (and restarts the cooldown) if the action may fire now: the
/// owner has no cooldown running, or it has run out.
pub fn try_cooldown(timers: &mut Elapser, owner: EntityId, cooldown_ms: u64) -> bool {
    if timers.contains(owner, &UseCase::Cooldown) && !timers.is_elapsed(owner, &UseCase::Cooldown) {
        return false;
    }
    timers.start(owner, UseCase::Cooldown, cooldown_ms, false);
    true
}

/// Open an invulnerability window.
pub fn start_invulnerability(timers: &mut Elapser, owner: EntityId, duration_ms: u64) {
    timers.start(owner, UseCase::Invulnerability, duration_ms, false);
}

/// True while an invulnerability window is open.
pub fn is_invulnerable(timers: &Elapser, owner: EntityId) -> bool {
    timers.contains(owner, &UseCase::Invulnerability)
        && !timers.peek_elapsed(owner, &UseCase::Invulnerability)
}

/// Light a fuse.
pub fn arm_fuse(timers: &mut Elapser, owner: EntityId, fuse_ms: u64) {
    timers.start(owner, UseCase::Fuse, fuse_ms, false);
}

/// Give a temporary object a lifetime.
pub fn set_lifetime(timers: &mut Elapser, owner: EntityId, lifetime_ms: u64) {
    timers.start(owner, UseCase::Lifetime, lifetime_ms, false);
}

/// Start a trap's on/off cycle. The trap flips every `period_ms`.
pub fn start_trap_cycle(timers: &mut Elapser, owner: EntityId, period_ms: u64) {
    timers.start(owner, UseCase::Trigger, period_ms, true);
}

/// Current walk-cycle frame, starting the cycle on first use.
pub fn animation_frame(timers: &mut Elapser, owner: EntityId, step_ms: u64, steps: u32) -> u32 {
    if !timers.contains(owner, &UseCase::Animation) {
        timers.start_steps(owner, UseCase::Animation, step_ms, steps, true);
    }
    timers.step_index(owner, &UseCase::Animation).unwrap_or(0)
}

/// Stop the walk cycle. The next [`animation_frame`] starts from frame 0.
pub fn stop_animation(timers: &mut Elapser, owner: EntityId) {
    timers.clear(owner, &UseCase::Animation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_rate_limits() {
        let hero = EntityId::new(1);
        let mut timers = Elapser::new();

        assert!(try_cooldown(&mut timers, hero, 400));
        assert!(!try_cooldown(&mut timers, hero, 400));

        timers.advance(399);
        assert!(!try_cooldown(&mut timers, hero, 400));

        timers.advance(1);
        assert!(try_cooldown(&mut timers, hero, 400));

        // Restarted: blocked again
        timers.advance(10);
        assert!(!try_cooldown(&mut timers, hero, 400));
    }

    #[test]
    fn test_invulnerability_window() {
        let hero = EntityId::new(1);
        let mut timers = Elapser::new();
        assert!(!is_invulnerable(&timers, hero));

        start_invulnerability(&mut timers, hero, 1_000);
        assert!(is_invulnerable(&timers, hero));

        timers.advance(999);
        assert!(is_invulnerable(&timers, hero));

        timers.advance(1);
        assert!(!is_invulnerable(&timers, hero));
    }

    #[test]
    fn test_animation_frames() {
        let hero = EntityId::new(1);
        let mut timers = Elapser::new();

        assert_eq!(animation_frame(&mut timers, hero, 150, 4), 0);
        timers.advance(150);
        assert_eq!(animation_frame(&mut timers, hero, 150, 4), 1);
        timers.advance(450);
        assert_eq!(animation_frame(&mut timers, hero, 150, 4), 0);

        stop_animation(&mut timers, hero);
        timers.advance(75);
        assert_eq!(animation_frame(&mut timers, hero, 150, 4), 0);
    }

    #[test]
    fn test_fuse_and_lifetime() {
        let bomb = EntityId::new(5);
        let coin = EntityId::new(6);
        let mut timers = Elapser::new();
        arm_fuse(&mut timers, bomb, 2_000);
        set_lifetime(&mut timers, coin, 5_000);

        timers.advance(2_000);
        assert!(timers.is_elapsed(bomb, &UseCase::Fuse));
        assert!(!timers.is_elapsed(coin, &UseCase::Lifetime));
    }
}
