//! Screenwalk demo
//!
//! Runs a scripted session on a small screen, logs what happens, and checks
//! that replaying the recorded frames reproduces the same state.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use screenwalk::{
    VERSION,
    core::{Direction, Point, Rect},
    game::{
        events::TickEventData,
        input::{Intent, Intents},
        screen::{Screen, ScreenLayout},
        snapshot::Snapshot,
        tick::{replay, tick, RecordedFrame},
        EntityId, EntityKind, Session, SimConfig,
    },
};

const DEMO_LAYOUT: &str = r#"{
    "name": "courtyard",
    "width": 320.0,
    "height": 240.0,
    "obstacles": [
        { "x": 140.0, "y": 40.0, "width": 16.0, "height": 120.0 },
        { "x": 40.0, "y": 180.0, "width": 200.0, "height": 12.0 }
    ]
}"#;

const DEMO_FRAMES: u32 = 600;

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SimConfig::from_env().context("loading SCREENWALK_* settings")?;

    info!("Screenwalk v{}", VERSION);
    info!("Tick Rate: {} Hz ({}ms frames)", config.tick_rate, config.frame_ms());

    demo_session(&config)
}

/// Build the demo session.
fn build_session() -> anyhow::Result<Session> {
    let layout: ScreenLayout = serde_json::from_str(DEMO_LAYOUT)?;
    let screen = Screen::from_layout(layout)?;
    let mut session = Session::new(screen);

    session.spawn(EntityKind::Player, Rect::new(20.0, 100.0, 16.0, 16.0), 90.0);

    let orc = session.spawn(EntityKind::Enemy, Rect::new(260.0, 60.0, 16.0, 16.0), 30.0);
    if let Some(entity) = session.get_mut(orc) {
        entity.destination = Some(Point::new(20.0, 100.0));
    }

    let golem = session.spawn(EntityKind::Enemy, Rect::new(260.0, 200.0, 24.0, 24.0), 40.0);
    if let Some(entity) = session.get_mut(golem) {
        entity.step_interval_ms = Some(250);
        entity.destination = Some(Point::new(60.0, 200.0));
    }

    session.spawn_bomb(Rect::new(200.0, 20.0, 8.0, 8.0), 2_000);
    session.spawn_pickup(Rect::new(100.0, 60.0, 8.0, 8.0), 5_000);
    session.spawn_trap(Rect::new(80.0, 140.0, 16.0, 16.0), 750);

    Ok(session)
}

/// Scripted player input: circle the screen, attacking now and then.
fn scripted_frames(player: EntityId, frame_ms: u64) -> Vec<RecordedFrame> {
    (0..DEMO_FRAMES)
        .map(|t| {
            let mut intent = Intent::toward(Direction::ALL[(t / 45) as usize % 8]);
            intent.set_attack(t % 20 == 0);

            let mut intents = Intents::new();
            intents.insert(player, intent);

            // Uneven frame pacing, like a real host
            RecordedFrame {
                elapsed_ms: frame_ms + (t % 3) as u64,
                intents,
            }
        })
        .collect()
}

fn demo_session(config: &SimConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");

    let initial = build_session()?;
    let player = EntityId::new(1);
    let frames = scripted_frames(player, config.frame_ms());

    let mut session = initial.clone();
    let mut total_events = 0;

    for frame in &frames {
        let result = tick(&mut session, frame.elapsed_ms, &frame.intents, config);
        if result.skipped {
            continue;
        }
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                TickEventData::Damaged { entity, source, health } => {
                    info!("{} hit by {} ({} health left)", entity, source, health);
                }
                TickEventData::FuseDetonated { entity, center } => {
                    info!("Bomb {} detonated at {}", entity, center);
                }
                TickEventData::Expired { entity } => {
                    info!("{} expired", entity);
                }
                TickEventData::Defeated { entity } => {
                    info!("{} defeated", entity);
                }
                TickEventData::MovementSkipped { entity, reason } => {
                    info!("{} stayed put: {}", entity, reason);
                }
                _ => {}
            }
        }

        if session.tick % 120 == 0 {
            info!(
                "Tick {}: {} entities, {} timers, {} events so far",
                session.tick,
                session.entities.len(),
                session.timers.len(),
                total_events
            );
        }
    }

    // Print final results
    info!("=== Session Results ===");
    let snapshot = Snapshot::capture(&session);
    for entity in &snapshot.entities {
        info!(
            "{} {:?} at {} facing {:?} (frame {}, health {})",
            entity.id, entity.kind, entity.rect.origin, entity.facing, entity.frame, entity.health
        );
    }
    info!("Snapshot size: {} bytes", snapshot.to_bytes()?.len());

    let hash = session.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", total_events);

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay(initial, &frames, config);
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}
