use std::time::Duration;

use anyhow::Result;
use glam::Vec2;
use log::info;

use arena_physics::engine::game_loop::GameLoop;
use arena_physics::engine::physics::{
    layers, presets, DebugGeometry, EventQueue, PhysicsEvent, PhysicsWorld,
};

/// Simulated wall-clock seconds
const RUN_SECONDS: f32 = 4.0;

/// Frame pacing cycled through to exercise the accumulator (144, 60 and 30 Hz)
const FRAME_PACING: [Duration; 3] = [
    Duration::from_micros(6_944),
    Duration::from_micros(16_667),
    Duration::from_micros(33_333),
];

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting arena simulation...");

    let events = EventQueue::new();
    let mut world = PhysicsWorld::new().with_event_sink(events.clone());
    build_arena(&mut world)?;
    info!("Arena ready with {} bodies", world.registry().len());

    let mut game_loop = GameLoop::new(world.fixed_timestep());
    let mut debug = DebugGeometry::new();
    debug.set_enabled(true);
    debug.set_draw_contacts(true);

    let mut frame = 0;
    while game_loop.elapsed_secs() < RUN_SECONDS {
        let frame_time = FRAME_PACING[frame % FRAME_PACING.len()];
        frame += 1;

        for _ in 0..game_loop.begin_frame(frame_time) {
            world.update(game_loop.timestep_secs());
        }

        for event in events.drain() {
            match event {
                PhysicsEvent::PlayerEnemy(pair) => {
                    info!("Player {} touched enemy {}", pair.user_a.owner, pair.user_b.owner)
                }
                PhysicsEvent::BulletEnemy(pair) => {
                    info!("Bullet from {} hit enemy {}", pair.user_a.owner, pair.user_b.owner)
                }
                PhysicsEvent::PlayerPowerup(pair) => {
                    info!("Player {} reached power-up {}", pair.user_a.owner, pair.user_b.owner)
                }
                PhysicsEvent::Stepped { .. } => {}
            }
        }

        if game_loop.frame_count() % 60 == 0 {
            debug.prepare(&world);
            info!(
                "t={:.2}s fps={:.0} alpha={:.2} stats={:?} debug_lines={}",
                game_loop.elapsed_secs(),
                game_loop.fps(),
                game_loop.alpha(),
                world.stats(),
                debug.indices().len() / 2
            );
        }
    }

    // Look down from above the arena for the ground
    let hits = world.raycast(Vec2::new(0.0, -200.0), Vec2::Y, 1000.0, layers::PLATFORM);
    match hits.first() {
        Some(hit) => info!("Ground found at {:?} (distance {:.1})", hit.point, hit.distance),
        None => info!("No ground below the spawn point"),
    }

    info!(
        "Simulation finished: {} frames, {} physics steps",
        game_loop.frame_count(),
        game_loop.step_count()
    );
    Ok(())
}

fn build_arena(world: &mut PhysicsWorld) -> Result<()> {
    world.create_body(&presets::platform(0.0, 300.0, 1200.0, 40.0))?;
    world.create_body(&presets::platform(-300.0, 120.0, 200.0, 20.0))?;
    world.create_body(&presets::platform(300.0, 120.0, 200.0, 20.0))?;

    world.create_body(&presets::player(1, -40.0, 200.0))?;
    world.create_body(&presets::enemy(10, 40.0, 180.0))?;
    world.create_body(&presets::enemy(11, 300.0, 60.0))?;
    world.create_body(&presets::powerup(20, -300.0, 90.0))?;
    world.create_body(&presets::bullet(1, -400.0, 80.0, 900.0, 0.0))?;
    Ok(())
}
