//! Simulation Tick
//!
//! The per-frame driver. Each tick:
//!
//! 1. moves every entity with a motion intent (geometry solver, then overlap
//!    resolution against walls and solid entities)
//! 2. fires attacks whose cooldown allows it
//! 3. applies hostile contact damage
//! 4. advances the timer registry
//! 5. reacts to completed timers (fuses, lifetimes, traps, windows)
//! 6. refreshes animation frames
//!
//! An entity whose move cannot be computed or placed stays where it is for
//! the tick; the failure is logged and reported as an event.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::core::direction::Direction;
use crate::core::geometry::{MotionRequest, Target};
use crate::core::rect::Rect;
use crate::game::behavior;
use crate::game::config::SimConfig;
use crate::game::elapser::{TimerEvent, UseCase};
use crate::game::entity::{EntityId, EntityKind, Session};
use crate::game::events::{Blocker, TickEvent, TickEventData};
use crate::game::input::{Intent, Intents};
use crate::game::overlap::{overlapping_indices, rects_touch, resolve_overlap};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Elapsed time was below the minimum delay; nothing was simulated
    pub skipped: bool,
    /// Milliseconds simulated
    pub slice_ms: u64,
    /// Footprint of every entity after the tick
    pub positions: BTreeMap<EntityId, Rect>,
    /// Per moving entity: whether its move was blocked or corrected
    pub collisions: BTreeMap<EntityId, bool>,
    /// Events generated this tick
    pub events: Vec<TickEvent>,
}

impl TickResult {
    /// Timer completions reported this tick.
    pub fn timer_events(&self) -> impl Iterator<Item = &TimerEvent> {
        self.events.iter().filter_map(|event| match &event.data {
            TickEventData::TimerElapsed(timer) => Some(timer),
            _ => None,
        })
    }

    /// Whether `id` was blocked or corrected while moving this tick.
    pub fn collided(&self, id: EntityId) -> bool {
        self.collisions.get(&id).copied().unwrap_or(false)
    }
}

/// One recorded tick of input, for replays.
#[derive(Clone, Debug, Default)]
pub struct RecordedFrame {
    /// Host-measured time since the previous frame
    pub elapsed_ms: u64,
    /// Frozen intents for the frame
    pub intents: Intents,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `session` - The session state (will be mutated)
/// * `elapsed_ms` - Real time since the previous call
/// * `intents` - Frozen intents for this tick (BTreeMap for deterministic order)
/// * `config` - Simulation configuration
///
/// Elapsed time accumulates until it reaches `min_tick_delay_ms`; until then
/// the tick is skipped. At most `max_tick_delay_ms` is simulated at once.
pub fn tick(
    session: &mut Session,
    elapsed_ms: u64,
    intents: &Intents,
    config: &SimConfig,
) -> TickResult {
    let mut result = TickResult::default();

    session.pending_ms = session.pending_ms.saturating_add(elapsed_ms);
    if session.pending_ms < config.min_tick_delay_ms.max(1) {
        result.skipped = true;
        return result;
    }

    let slice_ms = session.pending_ms.min(config.max_tick_delay_ms);
    if session.pending_ms > slice_ms {
        debug!("Dropping {}ms of backlog", session.pending_ms - slice_ms);
    }
    session.pending_ms = 0;
    session.tick += 1;
    result.slice_ms = slice_ms;

    // 1. Movement
    let moving = move_entities(session, intents, slice_ms, config, &mut result.collisions);

    // 2. Attacks
    apply_actions(session, intents, config);

    // 3. Contact damage
    process_contacts(session, config);

    // 4. Advance timers
    let timer_events = session.timers.advance(slice_ms);

    // 5. Timer-driven state changes
    process_timer_events(session, timer_events);

    // 6. Animation frames
    update_animation(session, &moving, config);

    result.positions = session
        .entities
        .iter()
        .map(|(id, entity)| (*id, entity.rect))
        .collect();
    result.events = session.take_events();

    #[cfg(feature = "debug-tracing")]
    debug!(
        "Tick {} simulated {}ms: {} entities, {} timers, {} events",
        session.tick,
        slice_ms,
        session.entities.len(),
        session.timers.len(),
        result.events.len()
    );

    result
}

/// How one entity's move went.
enum StepOutcome {
    /// Position committed; `collided` if it was corrected
    Moved { collided: bool },
    /// Overlap could not be resolved; entity frozen
    Blocked,
    /// No position could be computed; entity frozen
    Failed,
}

/// Move every entity that wants to move. Returns the ones that tried.
fn move_entities(
    session: &mut Session,
    intents: &Intents,
    slice_ms: u64,
    config: &SimConfig,
    collisions: &mut BTreeMap<EntityId, bool>,
) -> BTreeSet<EntityId> {
    let mut moving = BTreeSet::new();

    // Collect IDs first: moves read other entities' rects
    let ids: Vec<EntityId> = session.entities.keys().copied().collect();

    for id in ids {
        let intent = intents.get(&id).copied().unwrap_or_default();
        let Some(request) = plan_motion(session, id, &intent, slice_ms) else {
            continue;
        };

        match step_entity(session, id, request, config) {
            StepOutcome::Moved { collided } => {
                collisions.insert(id, collided);
                moving.insert(id);
            }
            StepOutcome::Blocked => {
                collisions.insert(id, true);
                moving.insert(id);
            }
            StepOutcome::Failed => {
                collisions.insert(id, false);
            }
        }
    }

    moving
}

/// Build this tick's motion request for an entity, if it moves at all.
///
/// Held axes win over an intent destination, which wins over the entity's
/// standing destination. Step-walkers move in whole steps, one for every
/// period of their pacing timer that completes within the slice.
fn plan_motion(
    session: &mut Session,
    id: EntityId,
    intent: &Intent,
    slice_ms: u64,
) -> Option<MotionRequest> {
    let entity = session.entities.get(&id)?;
    let start = entity.rect.origin;
    let speed = entity.speed;
    let step_interval = entity.step_interval_ms;

    let target = match (intent.direction(), intent.destination.or(entity.destination)) {
        (Some(direction), _) => Target::Direction(direction),
        (None, Some(destination)) => Target::Point(destination),
        (None, None) => {
            // Standing still: restart pacing from scratch next time
            session.timers.clear(id, &UseCase::Movement);
            return None;
        }
    };
    if speed <= 0.0 {
        return None;
    }

    let distance = match step_interval {
        Some(interval_ms) => {
            if !session.timers.contains(id, &UseCase::Movement) {
                session.timers.start(id, UseCase::Movement, interval_ms, true);
            }
            // One step per period completing within this slice
            let steps = session
                .timers
                .take_periods_within(id, &UseCase::Movement, slice_ms);
            if steps == 0 {
                return None;
            }
            speed * (interval_ms.max(1) * steps) as f64 / 1000.0
        }
        None => speed * slice_ms as f64 / 1000.0,
    };

    Some(MotionRequest {
        start,
        target,
        distance,
        clamp_to_destination: matches!(target, Target::Point(_)),
    })
}

/// Solve, constrain and commit one entity's move.
fn step_entity(
    session: &mut Session,
    id: EntityId,
    request: MotionRequest,
    config: &SimConfig,
) -> StepOutcome {
    let tick = session.tick;

    let next = match request.resolve() {
        Ok(point) => point,
        Err(err) => {
            warn!("Skipping movement of {}: {}", id, err);
            session.push_event(TickEvent::movement_skipped(tick, id, err.to_string()));
            return StepOutcome::Failed;
        }
    };

    let Some(current) = session.entities.get(&id).map(|e| e.rect) else {
        return StepOutcome::Failed;
    };
    let facing = match request.target {
        Target::Direction(direction) => Some(direction),
        Target::Point(_) => Direction::between(current.origin, next),
    };

    let bounds = session.screen.bounds;
    let intended = current.moved_to(next);
    let candidate = bounds.clamp_inside(intended);

    let (obstacles, owners) = session.obstacles_for(id);
    let resolved = match resolve_overlap(candidate, &obstacles, config.max_resolve_iterations) {
        Ok(rect) => rect,
        Err(err) => {
            warn!("Freezing {} for this tick: {}", id, err);
            session.push_event(TickEvent::movement_skipped(tick, id, err.to_string()));
            return StepOutcome::Blocked;
        }
    };

    if !bounds.contains_rect(&resolved) {
        warn!("Freezing {}: pushed outside screen to {:?}", id, resolved);
        session.push_event(TickEvent::movement_skipped(tick, id, "pushed outside screen bounds"));
        return StepOutcome::Blocked;
    }

    let collided = resolved != intended;
    if collided {
        let mut blockers: Vec<Blocker> = overlapping_indices(&candidate, &obstacles)
            .into_iter()
            .map(|i| match owners[i] {
                Some(entity) => Blocker::Entity(entity),
                None => Blocker::Obstacle(i),
            })
            .collect();
        if candidate != intended {
            blockers.push(Blocker::ScreenEdge);
        }
        session.push_event(TickEvent::collided(tick, id, intended, resolved, blockers));
    }

    let mut arrived = None;
    if let Some(entity) = session.entities.get_mut(&id) {
        entity.rect = resolved;
        if facing.is_some() {
            entity.facing = facing;
        }
        if let Target::Point(destination) = request.target {
            if resolved.origin == destination {
                if entity.destination == Some(destination) {
                    entity.destination = None;
                }
                arrived = Some(destination);
            }
        }
    }
    if let Some(position) = arrived {
        session.push_event(TickEvent::destination_reached(tick, id, position));
    }

    StepOutcome::Moved { collided }
}

/// Fire attacks allowed by their cooldowns.
fn apply_actions(session: &mut Session, intents: &Intents, config: &SimConfig) {
    let tick = session.tick;

    for (id, intent) in intents {
        if !intent.attack_pressed() {
            continue;
        }
        let Some(facing) = session.entities.get(id).map(|e| e.facing) else {
            continue;
        };
        if behavior::try_cooldown(&mut session.timers, *id, config.attack_cooldown_ms) {
            session.push_event(TickEvent::attack_performed(tick, *id, facing));
        }
    }
}

/// Hurt players touching anything dangerous, then open their recovery window.
fn process_contacts(session: &mut Session, config: &SimConfig) {
    let tick = session.tick;

    let hazards: Vec<(EntityId, Rect)> = session
        .entities
        .values()
        .filter(|e| e.is_dangerous())
        .map(|e| (e.id, e.rect))
        .collect();
    let players: Vec<(EntityId, Rect)> = session
        .entities
        .values()
        .filter(|e| e.kind == EntityKind::Player)
        .map(|e| (e.id, e.rect))
        .collect();

    let mut defeated = Vec::new();

    for (victim, victim_rect) in players {
        if behavior::is_invulnerable(&session.timers, victim) {
            continue;
        }
        let Some((source, _)) = hazards
            .iter()
            .find(|(source, rect)| *source != victim && rects_touch(&victim_rect, rect))
        else {
            continue;
        };

        let Some(entity) = session.entities.get_mut(&victim) else {
            continue;
        };
        entity.health = entity.health.saturating_sub(config.contact_damage);
        let health = entity.health;

        behavior::start_invulnerability(&mut session.timers, victim, config.invulnerability_ms);
        session.push_event(TickEvent::damaged(tick, victim, *source, health));

        if health == 0 {
            defeated.push(victim);
        }
    }

    for id in defeated {
        if session.despawn(id).is_ok() {
            session.push_event(TickEvent::defeated(tick, id));
        }
    }
}

/// React to timers that completed this tick.
fn process_timer_events(session: &mut Session, timer_events: Vec<TimerEvent>) {
    let tick = session.tick;

    for event in timer_events {
        let owner = event.key.owner;
        let use_case = event.key.use_case.clone();
        let periods = event.periods;

        #[cfg(feature = "debug-tracing")]
        debug!("Timer {}/{} completed {} period(s)", owner, use_case, periods);

        session.push_event(TickEvent::timer_elapsed(tick, event));

        match use_case {
            UseCase::Fuse => {
                if let Ok(entity) = session.despawn(owner) {
                    session.push_event(TickEvent::fuse_detonated(tick, owner, entity.rect.center()));
                }
            }
            UseCase::Lifetime => {
                if session.despawn(owner).is_ok() {
                    session.push_event(TickEvent::expired(tick, owner));
                }
            }
            UseCase::Trigger => {
                // An even number of flips leaves the trap as it was
                if periods % 2 == 1 {
                    if let Some(entity) = session.entities.get_mut(&owner) {
                        entity.active = !entity.active;
                        let active = entity.active;
                        session.push_event(TickEvent::trap_toggled(tick, owner, active));
                    }
                }
            }
            UseCase::Cooldown | UseCase::Invulnerability => {
                session.timers.clear(owner, &use_case);
            }
            UseCase::Movement | UseCase::Animation | UseCase::Named(_) => {}
        }
    }
}

/// Step walk cycles of moving entities; reset the rest to frame 0.
fn update_animation(session: &mut Session, moving: &BTreeSet<EntityId>, config: &SimConfig) {
    let ids: Vec<EntityId> = session.entities.keys().copied().collect();

    for id in ids {
        let frame = if moving.contains(&id) {
            behavior::animation_frame(
                &mut session.timers,
                id,
                config.animation_step_ms,
                config.animation_steps,
            )
        } else {
            behavior::stop_animation(&mut session.timers, id);
            0
        };
        if let Some(entity) = session.entities.get_mut(&id) {
            entity.animation_frame = frame;
        }
    }
}

/// Replay recorded frames against a session.
///
/// Returns the final state and every event produced.
pub fn replay(
    initial_state: Session,
    frames: &[RecordedFrame],
    config: &SimConfig,
) -> (Session, Vec<TickEvent>) {
    let mut session = initial_state;
    let mut all_events = Vec::new();

    for frame in frames {
        let result = tick(&mut session, frame.elapsed_ms, &frame.intents, config);
        all_events.extend(result.events);
    }

    (session, all_events)
}
